use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use glimmer_api_core::DataModel;
use glimmer_surface_core::{Canvas, Renderer};
use uuid::Uuid;

use crate::profile::Profile;

/// Plugs profiles into the surface render loop.
///
/// Active profiles are updated and drawn in order each frame, later profiles on top. Hosts
/// write into the shared data model from any thread; each frame reads one consistent view.
pub struct ProfileRenderer {
    profiles: Vec<Profile>,
    data: Arc<RwLock<DataModel>>,
}

impl ProfileRenderer {
    pub fn new(data: Arc<RwLock<DataModel>>) -> Self {
        Self {
            profiles: Vec::new(),
            data,
        }
    }

    pub fn data(&self) -> Arc<RwLock<DataModel>> {
        Arc::clone(&self.data)
    }

    pub fn add_profile(&mut self, profile: Profile) {
        log::debug!("profile '{}' added to the renderer", profile.name());
        self.profiles.push(profile);
    }

    pub fn remove_profile(&mut self, id: Uuid) -> Option<Profile> {
        let index = self.profiles.iter().position(|p| p.id() == id)?;
        Some(self.profiles.remove(index))
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile_mut(&mut self, id: Uuid) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.id() == id)
    }
}

impl Renderer for ProfileRenderer {
    fn render(&mut self, canvas: &mut dyn Canvas, delta: Duration) -> anyhow::Result<()> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        for profile in self.profiles.iter_mut().filter(|p| p.active) {
            profile.update(delta, &*data);
            profile.render(canvas);
        }
        Ok(())
    }
}
