//! Brushes decide what a layer paints inside its shape.

use std::sync::Arc;

use glimmer_animation_core::BrushRef;
use glimmer_api_core::{ColorGradient, Rgba};
use hashbrown::HashMap;

use crate::layer::LayerProperties;

/// Provider name of the brushes shipped with the core.
pub const BUILTIN_PROVIDER: &str = "glimmer";

/// Fill produced by a brush for one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Sampled across the shape, left to right or top to bottom.
    Gradient {
        gradient: ColorGradient,
        vertical: bool,
    },
}

impl Paint {
    /// Colour at normalized shape coordinates `u`, `v`.
    pub fn color_at(&self, u: f32, v: f32) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Gradient { gradient, vertical } => {
                gradient.color_at(if *vertical { v } else { u })
            }
        }
    }
}

pub trait Brush: Send + Sync {
    /// Reads the layer's current property values.
    fn paint(&self, properties: &LayerProperties) -> Paint;
}

/// Fills with the layer's `color`.
pub struct SolidBrush;

impl Brush for SolidBrush {
    fn paint(&self, properties: &LayerProperties) -> Paint {
        Paint::Solid(*properties.color.current())
    }
}

/// Fills with the layer's `gradient`, oriented by `gradient_vertical`.
pub struct GradientBrush;

impl Brush for GradientBrush {
    fn paint(&self, properties: &LayerProperties) -> Paint {
        Paint::Gradient {
            gradient: properties.gradient.current().clone(),
            vertical: *properties.gradient_vertical.current(),
        }
    }
}

/// Brushes keyed by provider and name.
#[derive(Default)]
pub struct BrushRegistry {
    brushes: HashMap<BrushRef, Arc<dyn Brush>>,
}

impl BrushRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BrushRef::new(BUILTIN_PROVIDER, "solid"), SolidBrush);
        registry.register(BrushRef::new(BUILTIN_PROVIDER, "gradient"), GradientBrush);
        registry
    }

    pub fn register(&mut self, key: BrushRef, brush: impl Brush + 'static) {
        if self.brushes.insert(key.clone(), Arc::new(brush)).is_some() {
            log::debug!("brush {}:{} replaced", key.provider, key.brush);
        }
    }

    pub fn get(&self, key: &BrushRef) -> Option<&Arc<dyn Brush>> {
        self.brushes.get(key)
    }

    pub fn contains(&self, key: &BrushRef) -> bool {
        self.brushes.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_api_core::GradientStop;

    #[test]
    fn it_should_paint_from_layer_properties() {
        let registry = BrushRegistry::with_builtins();
        let mut props = LayerProperties::default();
        props.color.set_base(Rgba::opaque(1, 2, 3));
        props.gradient.set_base(ColorGradient::new(vec![
            GradientStop {
                position: 0.0,
                color: Rgba::BLACK,
            },
            GradientStop {
                position: 1.0,
                color: Rgba::WHITE,
            },
        ]));
        props.gradient_vertical.set_base(true);

        let solid = registry.get(&BrushRef::new("glimmer", "solid")).expect("solid");
        assert_eq!(solid.paint(&props).color_at(0.9, 0.9), Rgba::opaque(1, 2, 3));

        let gradient = registry
            .get(&BrushRef::new("glimmer", "gradient"))
            .expect("gradient");
        let paint = gradient.paint(&props);
        assert_eq!(paint.color_at(1.0, 0.0), Rgba::BLACK);
        assert_eq!(paint.color_at(0.0, 1.0), Rgba::WHITE);
        assert!(!registry.contains(&BrushRef::new("glimmer", "noise")));
    }
}
