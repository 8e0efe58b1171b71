use std::time::Duration;

use glimmer_api_core::ValueSource;
use glimmer_surface_core::Canvas;

use crate::brush::BrushRegistry;
use crate::descriptor::{ElementDescriptor, FolderDescriptor};
use crate::effect::EffectRegistry;
use crate::element::{DisplayState, ProfileElement};
use crate::error::ProfileError;
use crate::layer::Layer;
use crate::scripts::ScriptLibrary;

/// Groups elements under one condition and timeline. Children are only displayed while the
/// folder is.
pub struct Folder {
    display: DisplayState,
    children: Vec<ProfileElement>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            display: DisplayState::new(name),
            children: Vec::new(),
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayState {
        &mut self.display
    }

    pub fn name(&self) -> &str {
        &self.display.name
    }

    /// Top-most child first.
    pub fn children(&self) -> &[ProfileElement] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<ProfileElement> {
        &mut self.children
    }

    pub(crate) fn load(
        data: &FolderDescriptor,
        scripts: &ScriptLibrary,
        brushes: &BrushRegistry,
        effects: &EffectRegistry,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            display: DisplayState::load(&data.display, scripts)?,
            children: load_elements(&data.children, scripts, brushes, effects)?,
        })
    }

    pub(crate) fn save(&self) -> FolderDescriptor {
        FolderDescriptor {
            display: self.display.save(),
            children: save_elements(&self.children),
        }
    }

    pub(crate) fn update(
        &mut self,
        delta: Duration,
        parent_met: bool,
        scripts: &ScriptLibrary,
        data: &dyn ValueSource,
    ) {
        self.display.update(delta, parent_met, scripts, data);
        let met = self.display.condition_met();
        update_elements(&mut self.children, delta, met, scripts, data);
    }

    pub(crate) fn render(&self, canvas: &mut dyn Canvas, brushes: &BrushRegistry) {
        if self.display.is_displayed() {
            render_elements(&self.children, canvas, brushes);
        }
    }
}

pub(crate) fn load_elements(
    data: &[ElementDescriptor],
    scripts: &ScriptLibrary,
    brushes: &BrushRegistry,
    effects: &EffectRegistry,
) -> Result<Vec<ProfileElement>, ProfileError> {
    data.iter()
        .map(|element| match element {
            ElementDescriptor::Folder(f) => {
                Folder::load(f, scripts, brushes, effects).map(ProfileElement::Folder)
            }
            ElementDescriptor::Layer(l) => {
                Layer::load(l, scripts, brushes, effects).map(ProfileElement::Layer)
            }
        })
        .collect()
}

pub(crate) fn save_elements(elements: &[ProfileElement]) -> Vec<ElementDescriptor> {
    elements
        .iter()
        .map(|element| match element {
            ProfileElement::Folder(f) => ElementDescriptor::Folder(f.save()),
            ProfileElement::Layer(l) => ElementDescriptor::Layer(l.save()),
        })
        .collect()
}

pub(crate) fn update_elements(
    elements: &mut [ProfileElement],
    delta: Duration,
    parent_met: bool,
    scripts: &ScriptLibrary,
    data: &dyn ValueSource,
) {
    for element in elements {
        match element {
            ProfileElement::Folder(f) => f.update(delta, parent_met, scripts, data),
            ProfileElement::Layer(l) => l.update(delta, parent_met, scripts, data),
        }
    }
}

/// Bottom-most element is drawn first so the first element ends up on top.
pub(crate) fn render_elements(
    elements: &[ProfileElement],
    canvas: &mut dyn Canvas,
    brushes: &BrushRegistry,
) {
    for element in elements.iter().rev() {
        match element {
            ProfileElement::Folder(f) => f.render(canvas, brushes),
            ProfileElement::Layer(l) => l.render(canvas, brushes),
        }
    }
}

/// Depth-first search for a layer by name.
pub(crate) fn find_layer<'a>(elements: &'a [ProfileElement], name: &str) -> Option<&'a Layer> {
    elements.iter().find_map(|element| match element {
        ProfileElement::Layer(l) if l.name() == name => Some(l),
        ProfileElement::Layer(_) => None,
        ProfileElement::Folder(f) => find_layer(&f.children, name),
    })
}

pub(crate) fn find_layer_mut<'a>(
    elements: &'a mut [ProfileElement],
    name: &str,
) -> Option<&'a mut Layer> {
    elements.iter_mut().find_map(|element| match element {
        ProfileElement::Layer(l) if l.name() == name => Some(l),
        ProfileElement::Layer(_) => None,
        ProfileElement::Folder(f) => find_layer_mut(&mut f.children, name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_api_core::{NoData, Rgba, Vec2};
    use glimmer_surface_core::SoftwareCanvas;

    fn layer(name: &str, color: Rgba, width: f32) -> ProfileElement {
        let mut layer = Layer::new(name);
        layer.properties_mut().color.set_base(color);
        layer.properties_mut().size.set_base(Vec2::new(width, 4.0));
        ProfileElement::Layer(layer)
    }

    #[test]
    fn it_should_draw_the_first_child_on_top() {
        let mut folder = Folder::new("group");
        folder.children_mut().push(layer("top", Rgba::opaque(255, 0, 0), 2.0));
        folder.children_mut().push(layer("bottom", Rgba::opaque(0, 0, 255), 4.0));
        folder.update(Duration::from_millis(16), true, &ScriptLibrary::new(), &NoData);

        let mut canvas = SoftwareCanvas::new(4, 4);
        folder.render(&mut canvas, &BrushRegistry::with_builtins());
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(canvas.pixel(3, 0), Some(Rgba::opaque(0, 0, 255)));
    }

    #[test]
    fn it_should_hide_children_of_a_hidden_folder() {
        let mut folder = Folder::new("group");
        folder.children_mut().push(layer("only", Rgba::WHITE, 4.0));
        folder.display_mut().enabled = false;

        let mut canvas = SoftwareCanvas::new(4, 4);
        folder.render(&mut canvas, &BrushRegistry::with_builtins());
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn it_should_find_nested_layers() {
        let mut inner = Folder::new("inner");
        inner.children_mut().push(layer("deep", Rgba::WHITE, 1.0));
        let mut elements = vec![ProfileElement::Folder(inner), layer("shallow", Rgba::WHITE, 1.0)];
        assert!(find_layer(&elements, "deep").is_some());
        assert!(find_layer(&elements, "inner").is_none());
        find_layer_mut(&mut elements, "shallow")
            .expect("top level")
            .display_mut()
            .enabled = false;
        assert!(!elements[1].display().enabled);
    }
}
