use std::sync::Arc;
use std::time::Duration;

use glimmer_api_core::ValueSource;
use glimmer_graph_core::{NodeRegistry, NodeScript};
use glimmer_surface_core::Canvas;
use uuid::Uuid;

use crate::brush::BrushRegistry;
use crate::descriptor::ProfileDescriptor;
use crate::effect::EffectRegistry;
use crate::element::ProfileElement;
use crate::error::ProfileError;
use crate::folder::{
    find_layer, find_layer_mut, load_elements, render_elements, save_elements, update_elements,
};
use crate::layer::Layer;
use crate::scripts::ScriptLibrary;

/// A loaded profile: the element tree, its script library and the brushes it draws with.
pub struct Profile {
    id: Uuid,
    name: String,
    elements: Vec<ProfileElement>,
    scripts: ScriptLibrary,
    brushes: Arc<BrushRegistry>,
    pub active: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>, brushes: Arc<BrushRegistry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: Vec::new(),
            scripts: ScriptLibrary::new(),
            brushes,
            active: true,
        }
    }

    /// Build a profile from its descriptor.
    ///
    /// Scripts load first so conditions and bindings can be checked against them. Any failure
    /// rejects the whole descriptor.
    pub fn load(
        data: &ProfileDescriptor,
        nodes: &NodeRegistry,
        brushes: Arc<BrushRegistry>,
        effects: &EffectRegistry,
    ) -> Result<Self, ProfileError> {
        let mut scripts = ScriptLibrary::new();
        for script_data in &data.scripts {
            let script = NodeScript::load(script_data, nodes).map_err(|source| {
                ProfileError::Script {
                    name: script_data.name.clone(),
                    source,
                }
            })?;
            if scripts.contains(script.id()) {
                return Err(ProfileError::DuplicateScript(script.id()));
            }
            scripts.insert(script);
        }
        let elements = load_elements(&data.elements, &scripts, &brushes, effects)?;
        log::info!(
            "profile '{}' loaded: {} elements, {} scripts",
            data.name,
            elements.len(),
            scripts.len()
        );

        Ok(Self {
            id: data.id,
            name: data.name.clone(),
            elements,
            scripts,
            brushes,
            active: true,
        })
    }

    pub fn save(&self) -> ProfileDescriptor {
        ProfileDescriptor {
            id: self.id,
            name: self.name.clone(),
            scripts: self.scripts.iter().map(NodeScript::save).collect(),
            elements: save_elements(&self.elements),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-most element first.
    pub fn elements(&self) -> &[ProfileElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<ProfileElement> {
        &mut self.elements
    }

    pub fn scripts(&self) -> &ScriptLibrary {
        &self.scripts
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptLibrary {
        &mut self.scripts
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        find_layer(&self.elements, name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        find_layer_mut(&mut self.elements, name)
    }

    /// Evaluate every script once, then advance each element's timeline and properties.
    pub fn update(&mut self, delta: Duration, data: &dyn ValueSource) {
        self.scripts.evaluate(data);
        update_elements(&mut self.elements, delta, true, &self.scripts, data);
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        render_elements(&self.elements, canvas, &self.brushes);
    }
}
