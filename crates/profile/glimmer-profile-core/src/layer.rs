//! Layers: a shape filled by a brush, every visual setting held in an animatable property.

use std::time::Duration;

use glimmer_animation_core::{
    BindingContext, BrushRef, DynProperty, EnumChoice, LayerProperty, PropertyData,
};
use glimmer_api_core::{ColorGradient, GradientStop, Rect, Rgba, ValueSource, Vec2};
use glimmer_surface_core::Canvas;
use indexmap::IndexMap;

use crate::brush::{BrushRegistry, Paint, BUILTIN_PROVIDER};
use crate::descriptor::{EffectDescriptor, LayerDescriptor};
use crate::effect::{EffectInstance, EffectRegistry};
use crate::element::DisplayState;
use crate::error::ProfileError;
use crate::scripts::ScriptLibrary;

/// Enumeration backing the `shape` property.
pub const SHAPE_ENUM: &str = "layer-shape";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Rectangle,
    Ellipse,
}

impl Shape {
    pub fn member(self) -> &'static str {
        match self {
            Shape::Rectangle => "rectangle",
            Shape::Ellipse => "ellipse",
        }
    }

    pub fn choice(self) -> EnumChoice {
        EnumChoice::new(SHAPE_ENUM, self.member())
    }

    fn from_choice(choice: &EnumChoice) -> Option<Shape> {
        if choice.ty != SHAPE_ENUM {
            return None;
        }
        match choice.member.as_str() {
            "rectangle" => Some(Shape::Rectangle),
            "ellipse" => Some(Shape::Ellipse),
            _ => None,
        }
    }

    /// Whether normalized coordinates fall inside the shape.
    fn contains(self, u: f32, v: f32) -> bool {
        match self {
            Shape::Rectangle => true,
            Shape::Ellipse => {
                let (dx, dy) = (u - 0.5, v - 0.5);
                dx * dx + dy * dy <= 0.25
            }
        }
    }
}

#[derive(Clone)]
pub struct LayerProperties {
    pub shape: LayerProperty<EnumChoice>,
    /// Top-left corner in surface units.
    pub position: LayerProperty<Vec2>,
    pub size: LayerProperty<Vec2>,
    /// Percentage, 0 to 100.
    pub opacity: LayerProperty<f32>,
    pub brush: LayerProperty<BrushRef>,
    pub color: LayerProperty<Rgba>,
    pub gradient: LayerProperty<ColorGradient>,
    pub gradient_vertical: LayerProperty<bool>,
}

impl Default for LayerProperties {
    fn default() -> Self {
        Self {
            shape: LayerProperty::new(Shape::Rectangle.choice()),
            position: LayerProperty::new(Vec2::ZERO),
            size: LayerProperty::new(Vec2::new(100.0, 100.0)),
            opacity: LayerProperty::new(100.0),
            brush: LayerProperty::new(BrushRef::new(BUILTIN_PROVIDER, "solid")),
            color: LayerProperty::new(Rgba::WHITE),
            gradient: LayerProperty::new(ColorGradient::new(vec![
                GradientStop {
                    position: 0.0,
                    color: Rgba::opaque(255, 0, 0),
                },
                GradientStop {
                    position: 1.0,
                    color: Rgba::opaque(0, 0, 255),
                },
            ])),
            gradient_vertical: LayerProperty::new(false),
        }
    }
}

impl LayerProperties {
    pub const NAMES: [&'static str; 8] = [
        "shape",
        "position",
        "size",
        "opacity",
        "brush",
        "color",
        "gradient",
        "gradient_vertical",
    ];

    pub fn get(&self, name: &str) -> Option<&dyn DynProperty> {
        self.all()
            .into_iter()
            .find_map(|(n, p)| (n == name).then_some(p))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn DynProperty> {
        self.all_mut()
            .into_iter()
            .find_map(|(n, p)| (n == name).then_some(p))
    }

    fn all(&self) -> [(&'static str, &dyn DynProperty); 8] {
        [
            ("shape", &self.shape),
            ("position", &self.position),
            ("size", &self.size),
            ("opacity", &self.opacity),
            ("brush", &self.brush),
            ("color", &self.color),
            ("gradient", &self.gradient),
            ("gradient_vertical", &self.gradient_vertical),
        ]
    }

    fn all_mut(&mut self) -> [(&'static str, &mut dyn DynProperty); 8] {
        [
            ("shape", &mut self.shape),
            ("position", &mut self.position),
            ("size", &mut self.size),
            ("opacity", &mut self.opacity),
            ("brush", &mut self.brush),
            ("color", &mut self.color),
            ("gradient", &mut self.gradient),
            ("gradient_vertical", &mut self.gradient_vertical),
        ]
    }

    pub fn update(&mut self, progress: Duration, delta: Duration, ctx: &BindingContext<'_>) {
        for (_, property) in self.all_mut() {
            property.update(progress, delta, ctx);
        }
    }

    /// Shape bounds in surface units.
    pub fn rect(&self) -> Rect {
        let p = self.position.current();
        let s = self.size.current();
        Rect::new(p.x, p.y, s.x, s.y)
    }

    /// Unknown shape members draw as rectangles.
    pub fn shape(&self) -> Shape {
        Shape::from_choice(self.shape.current()).unwrap_or(Shape::Rectangle)
    }

    pub fn save(&self) -> IndexMap<String, PropertyData> {
        self.all()
            .into_iter()
            .map(|(name, p)| (name.to_string(), p.save()))
            .collect()
    }
}

pub struct Layer {
    display: DisplayState,
    properties: LayerProperties,
    effects: Vec<EffectInstance>,
    /// Properties sampled for each extra timeline started by copy-mode events, oldest first.
    copies: Vec<LayerProperties>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            display: DisplayState::new(name),
            properties: LayerProperties::default(),
            effects: Vec::new(),
            copies: Vec::new(),
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

    pub fn properties(&self) -> &LayerProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut LayerProperties {
        &mut self.properties
    }

    /// Effects in the order they run.
    pub fn effects(&self) -> &[EffectInstance] {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut Vec<EffectInstance> {
        &mut self.effects
    }

    pub fn effect(&self, name: &str) -> Option<&EffectInstance> {
        self.effects.iter().find(|e| e.name() == name)
    }

    pub fn effect_mut(&mut self, name: &str) -> Option<&mut EffectInstance> {
        self.effects.iter_mut().find(|e| e.name() == name)
    }

    /// Property sets of the copies currently playing, oldest first.
    pub fn copies(&self) -> &[LayerProperties] {
        &self.copies
    }

    pub(crate) fn load(
        data: &LayerDescriptor,
        scripts: &ScriptLibrary,
        brushes: &BrushRegistry,
        effects: &EffectRegistry,
    ) -> Result<Self, ProfileError> {
        let display = DisplayState::load(&data.display, scripts)?;
        let element = display.name.clone();
        let mut properties = LayerProperties::default();

        for (name, property) in &data.properties {
            load_property(&element, name, properties.get_mut(name), property, scripts)?;
        }
        let effects = data
            .effects
            .iter()
            .map(|effect| load_effect(&element, effect, scripts, effects))
            .collect::<Result<Vec<_>, _>>()?;

        let brush = properties.brush.base();
        if !brushes.contains(brush) {
            return Err(ProfileError::UnknownBrush {
                element,
                brush: format!("{}:{}", brush.provider, brush.brush),
            });
        }

        Ok(Self {
            display,
            properties,
            effects,
            copies: Vec::new(),
        })
    }

    pub(crate) fn save(&self) -> LayerDescriptor {
        LayerDescriptor {
            display: self.display.save(),
            properties: self.properties.save(),
            effects: self.effects.iter().map(EffectInstance::save).collect(),
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
        let ctx = BindingContext::new(data, scripts.results());
        let progress = self.display.timeline().position();
        self.properties.update(progress, delta, &ctx);
        for effect in &mut self.effects {
            effect.update(progress, delta, &ctx);
        }

        let timelines = self.display.copies();
        if self.copies.len() > timelines.len() {
            let finished = self.copies.len() - timelines.len();
            self.copies.drain(..finished);
        }
        while self.copies.len() < timelines.len() {
            self.copies.push(self.properties.clone());
        }
        for (copy, timeline) in self.copies.iter_mut().zip(timelines) {
            copy.update(timeline.position(), delta, &ctx);
        }
    }

    /// Draw the layer if it is displayed, clipped to its bounds. Copies draw over the main
    /// timeline, newest on top.
    pub(crate) fn render(&self, canvas: &mut dyn Canvas, brushes: &BrushRegistry) {
        if !self.display.is_displayed() {
            return;
        }
        if !self.display.timeline().is_finished() {
            self.render_properties(&self.properties, canvas, brushes);
        }
        for copy in &self.copies {
            self.render_properties(copy, canvas, brushes);
        }
    }

    fn render_properties(
        &self,
        properties: &LayerProperties,
        canvas: &mut dyn Canvas,
        brushes: &BrushRegistry,
    ) {
        let rect = properties.rect();
        if rect.is_empty() {
            return;
        }
        let opacity = (*properties.opacity.current() / 100.0).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let brush_ref = properties.brush.current();
        let Some(brush) = brushes.get(brush_ref) else {
            log::debug!(
                "layer '{}' skipped, brush {}:{} is not registered",
                self.name(),
                brush_ref.provider,
                brush_ref.brush
            );
            return;
        };
        let mut paint = brush.paint(properties);
        let shape = properties.shape();

        let depth = canvas.save();
        canvas.clip_rect(rect);
        let active = || self.effects.iter().filter(|e| !e.suspended);
        for effect in active() {
            effect.effect().pre_process(canvas, rect, &mut paint);
        }
        match (&paint, shape) {
            (Paint::Solid(color), Shape::Rectangle) => {
                canvas.fill_rect(rect, fade(*color, opacity));
            }
            _ => {
                let shader = |u: f32, v: f32| {
                    if shape.contains(u, v) {
                        fade(paint.color_at(u, v), opacity)
                    } else {
                        Rgba::TRANSPARENT
                    }
                };
                canvas.fill_rect_with(rect, &shader);
            }
        }
        for effect in active() {
            effect.effect().post_process(canvas, rect);
        }
        canvas.restore_to_count(depth);
    }
}

fn load_property(
    element: &str,
    name: &str,
    target: Option<&mut dyn DynProperty>,
    data: &PropertyData,
    scripts: &ScriptLibrary,
) -> Result<(), ProfileError> {
    let target = target.ok_or_else(|| ProfileError::UnknownProperty {
        element: element.to_string(),
        property: name.to_string(),
    })?;
    target.load(data).map_err(|source| ProfileError::Property {
        element: element.to_string(),
        property: name.to_string(),
        source,
    })?;
    if let Some(binding) = &data.binding {
        if let Some(script) = binding.scripts().into_iter().find(|id| !scripts.contains(*id)) {
            return Err(ProfileError::UnknownScript {
                element: element.to_string(),
                script,
            });
        }
    }
    Ok(())
}

fn load_effect(
    element: &str,
    data: &EffectDescriptor,
    scripts: &ScriptLibrary,
    effects: &EffectRegistry,
) -> Result<EffectInstance, ProfileError> {
    let effect = effects
        .create(&data.effect)
        .ok_or_else(|| ProfileError::UnknownEffect {
            element: element.to_string(),
            effect: data.effect.clone(),
        })?;
    let mut instance = EffectInstance::new(data.name.clone(), data.effect.clone(), effect);
    instance.suspended = data.suspended;
    let owner = format!("{element}/{}", data.name);
    for (name, property) in &data.properties {
        load_property(
            &owner,
            name,
            instance.effect_mut().property_mut(name),
            property,
            scripts,
        )?;
    }
    Ok(instance)
}

#[inline]
fn fade(color: Rgba, opacity: f32) -> Rgba {
    if opacity >= 1.0 {
        return color;
    }
    Rgba {
        a: (color.a as f32 * opacity).round() as u8,
        ..color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_animation_core::Keyframe;
    use glimmer_api_core::{NoData, Value};
    use glimmer_surface_core::SoftwareCanvas;

    fn render(layer: &Layer) -> SoftwareCanvas {
        let mut canvas = SoftwareCanvas::new(10, 10);
        canvas.clear(Rgba::BLACK);
        layer.render(&mut canvas, &BrushRegistry::with_builtins());
        canvas
    }

    fn sized(name: &str, w: f32, h: f32) -> Layer {
        let mut layer = Layer::new(name);
        layer.properties.size.set_base(Vec2::new(w, h));
        layer
    }

    #[test]
    fn it_should_look_up_properties_by_name() {
        let mut props = LayerProperties::default();
        for name in LayerProperties::NAMES {
            assert!(props.get(name).is_some(), "{name}");
        }
        assert!(props.get("rotation").is_none());

        let opacity = props.get_mut("opacity").expect("opacity");
        opacity
            .load(&PropertyData::new(Value::Numeric(40.0)))
            .expect("numeric loads into f32");
        assert_eq!(*props.opacity.current(), 40.0);
    }

    #[test]
    fn it_should_fill_its_rect_with_a_solid_colour() {
        let mut layer = sized("solid", 4.0, 10.0);
        layer.properties.color.set_base(Rgba::opaque(0, 255, 0));
        let canvas = render(&layer);
        assert_eq!(canvas.pixel(1, 5), Some(Rgba::opaque(0, 255, 0)));
        assert_eq!(canvas.pixel(6, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn it_should_blend_by_opacity() {
        let mut layer = sized("dim", 10.0, 10.0);
        layer.properties.opacity.set_base(50.0);
        let canvas = render(&layer);
        let px = canvas.pixel(5, 5).expect("inside");
        assert!(px.r > 120 && px.r < 135, "{px:?}");
        assert_eq!(px.a, 255);
    }

    #[test]
    fn it_should_mask_ellipses() {
        let mut layer = sized("dot", 10.0, 10.0);
        layer.properties.shape.set_base(Shape::Ellipse.choice());
        let canvas = render(&layer);
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn it_should_leave_the_canvas_state_balanced() {
        let layer = sized("any", 10.0, 10.0);
        let mut canvas = SoftwareCanvas::new(10, 10);
        layer.render(&mut canvas, &BrushRegistry::with_builtins());
        assert_eq!(canvas.save_count(), 0);
    }

    #[test]
    fn it_should_skip_hidden_layers() {
        let mut layer = sized("off", 10.0, 10.0);
        layer.display_mut().enabled = false;
        assert_eq!(render(&layer).pixel(5, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn it_should_run_effects_around_the_brush() {
        let registry = EffectRegistry::with_builtins();
        let mut layer = sized("fx", 10.0, 10.0);
        let mut tint = EffectInstance::new(
            "wash",
            "glimmer:tint",
            registry.create("glimmer:tint").expect("builtin"),
        );
        tint.effect_mut()
            .property_mut("color")
            .expect("color")
            .load(&PropertyData::new(Value::Color(Rgba::opaque(0, 0, 255))))
            .expect("colour loads");
        tint.effect_mut()
            .property_mut("strength")
            .expect("strength")
            .load(&PropertyData::new(Value::Numeric(100.0)))
            .expect("numeric loads");
        tint.suspended = true;
        layer.effects_mut().push(EffectInstance::new(
            "dim",
            "glimmer:dim",
            registry.create("glimmer:dim").expect("builtin"),
        ));
        layer.effects_mut().push(tint);

        assert_eq!(render(&layer).pixel(5, 5), Some(Rgba::opaque(128, 128, 128)));
        layer.effect_mut("wash").expect("wash").suspended = false;
        assert_eq!(render(&layer).pixel(5, 5), Some(Rgba::opaque(0, 0, 255)));
        assert_eq!(layer.save().effects.len(), 2);
    }

    #[test]
    fn it_should_key_properties_off_the_timeline() {
        let mut layer = sized("fade-in", 10.0, 10.0);
        let opacity = &mut layer.properties.opacity;
        opacity.add_keyframe(Keyframe::linear(Duration::ZERO, 0.0)).unwrap();
        opacity
            .add_keyframe(Keyframe::linear(Duration::from_secs(2), 100.0))
            .unwrap();
        opacity.set_keyframes_enabled(true).unwrap();

        layer.update(Duration::from_secs(1), true, &ScriptLibrary::new(), &NoData);
        assert_eq!(*layer.properties.opacity.current(), 50.0);
    }
}
