//! Layer effects: ordered, suspendable stages that run around a layer's brush.

use std::sync::Arc;
use std::time::Duration;

use glimmer_animation_core::{BindingContext, DynProperty, LayerProperty};
use glimmer_api_core::{Rect, Rgba};
use glimmer_surface_core::Canvas;
use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::brush::{Paint, BUILTIN_PROVIDER};
use crate::descriptor::EffectDescriptor;

pub trait LayerEffect: Send {
    /// Property names in save order.
    fn property_names(&self) -> &'static [&'static str];
    fn property(&self, name: &str) -> Option<&dyn DynProperty>;
    fn property_mut(&mut self, name: &str) -> Option<&mut dyn DynProperty>;

    /// Runs before the brush paints, inside the layer's clip. May replace the paint.
    fn pre_process(&self, _canvas: &mut dyn Canvas, _bounds: Rect, _paint: &mut Paint) {}

    /// Runs after the brush has painted, inside the layer's clip.
    fn post_process(&self, _canvas: &mut dyn Canvas, _bounds: Rect) {}
}

/// Scales the paint's colour channels by `brightness` percent.
pub struct DimEffect {
    pub brightness: LayerProperty<f32>,
}

impl Default for DimEffect {
    fn default() -> Self {
        Self {
            brightness: LayerProperty::new(50.0),
        }
    }
}

impl LayerEffect for DimEffect {
    fn property_names(&self) -> &'static [&'static str] {
        &["brightness"]
    }

    fn property(&self, name: &str) -> Option<&dyn DynProperty> {
        (name == "brightness").then_some(&self.brightness as &dyn DynProperty)
    }

    fn property_mut(&mut self, name: &str) -> Option<&mut dyn DynProperty> {
        (name == "brightness").then_some(&mut self.brightness as &mut dyn DynProperty)
    }

    fn pre_process(&self, _canvas: &mut dyn Canvas, _bounds: Rect, paint: &mut Paint) {
        let factor = (*self.brightness.current() / 100.0).clamp(0.0, 1.0);
        match paint {
            Paint::Solid(color) => *color = scale(*color, factor),
            Paint::Gradient { gradient, .. } => {
                for stop in &mut gradient.stops {
                    stop.color = scale(stop.color, factor);
                }
            }
        }
    }
}

fn scale(color: Rgba, factor: f32) -> Rgba {
    let channel = |c: u8| (c as f32 * factor).round() as u8;
    Rgba {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
        a: color.a,
    }
}

/// Washes `color` over the layer bounds at `strength` percent.
pub struct TintEffect {
    pub color: LayerProperty<Rgba>,
    pub strength: LayerProperty<f32>,
}

impl Default for TintEffect {
    fn default() -> Self {
        Self {
            color: LayerProperty::new(Rgba::opaque(255, 160, 64)),
            strength: LayerProperty::new(50.0),
        }
    }
}

impl LayerEffect for TintEffect {
    fn property_names(&self) -> &'static [&'static str] {
        &["color", "strength"]
    }

    fn property(&self, name: &str) -> Option<&dyn DynProperty> {
        match name {
            "color" => Some(&self.color),
            "strength" => Some(&self.strength),
            _ => None,
        }
    }

    fn property_mut(&mut self, name: &str) -> Option<&mut dyn DynProperty> {
        match name {
            "color" => Some(&mut self.color),
            "strength" => Some(&mut self.strength),
            _ => None,
        }
    }

    fn post_process(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        let strength = (*self.strength.current() / 100.0).clamp(0.0, 1.0);
        if strength <= 0.0 {
            return;
        }
        let color = *self.color.current();
        canvas.fill_rect(
            bounds,
            Rgba {
                a: (color.a as f32 * strength).round() as u8,
                ..color
            },
        );
    }
}

/// An effect placed on a layer.
pub struct EffectInstance {
    name: String,
    key: String,
    /// Suspended effects neither update nor run.
    pub suspended: bool,
    effect: Box<dyn LayerEffect>,
}

impl EffectInstance {
    pub fn new(name: impl Into<String>, key: impl Into<String>, effect: Box<dyn LayerEffect>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            suspended: false,
            effect,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key, `provider:effect`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn effect(&self) -> &dyn LayerEffect {
        self.effect.as_ref()
    }

    pub fn effect_mut(&mut self) -> &mut dyn LayerEffect {
        self.effect.as_mut()
    }

    pub(crate) fn update(&mut self, progress: Duration, delta: Duration, ctx: &BindingContext<'_>) {
        if self.suspended {
            return;
        }
        for name in self.effect.property_names() {
            if let Some(property) = self.effect.property_mut(name) {
                property.update(progress, delta, ctx);
            }
        }
    }

    pub(crate) fn save(&self) -> EffectDescriptor {
        let properties: IndexMap<_, _> = self
            .effect
            .property_names()
            .iter()
            .filter_map(|name| Some((name.to_string(), self.effect.property(name)?.save())))
            .collect();
        EffectDescriptor {
            name: self.name.clone(),
            effect: self.key.clone(),
            suspended: self.suspended,
            properties,
        }
    }
}

type EffectFactory = Arc<dyn Fn() -> Box<dyn LayerEffect> + Send + Sync>;

/// Effect constructors keyed by `provider:effect`.
#[derive(Default)]
pub struct EffectRegistry {
    factories: HashMap<String, EffectFactory>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(format!("{BUILTIN_PROVIDER}:dim"), || {
            Box::new(DimEffect::default())
        });
        registry.register(format!("{BUILTIN_PROVIDER}:tint"), || {
            Box::new(TintEffect::default())
        });
        registry
    }

    pub fn register(
        &mut self,
        key: impl Into<String>,
        factory: impl Fn() -> Box<dyn LayerEffect> + Send + Sync + 'static,
    ) {
        let key = key.into();
        if self.factories.insert(key.clone(), Arc::new(factory)).is_some() {
            log::debug!("effect {key} replaced");
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// A fresh effect with default property values.
    pub fn create(&self, key: &str) -> Option<Box<dyn LayerEffect>> {
        self.factories.get(key).map(|factory| factory())
    }
}
