//! Property value capabilities.
//!
//! Every type a [`LayerProperty`](crate::LayerProperty) can hold implements [`PropertyValue`],
//! which declares whether the type can be keyframed, how two values blend and which
//! sub-properties a data binding may write into.

use std::fmt;

use glimmer_api_core::{ColorGradient, Rgba, Value, ValueKind, Vec2};
use serde::{Deserialize, Serialize};

use crate::interp;

pub trait PropertyValue: Clone + PartialEq + fmt::Debug + Send + 'static {
    /// Value kind used when the property is type-erased.
    const KIND: ValueKind;
    /// Whether keyframes may be enabled or added.
    const KEYFRAMES: bool = true;
    /// Names of the sub-properties a data binding can target. Empty means unbindable.
    const SUB_PROPERTIES: &'static [&'static str] = &[];

    /// Blend towards `to` with eased progress `t`. Non-blendable types step.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        interp::step(self, to, t)
    }

    fn read_sub(&self, _sub: &str) -> Option<f32> {
        None
    }

    /// Write `v` into the named sub-property. Returns false for unknown names.
    fn write_sub(&mut self, _sub: &str, _v: f32) -> bool {
        false
    }

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Whether `T` exposes a sub-property called `sub`.
pub fn has_sub_property<T: PropertyValue>(sub: &str) -> bool {
    T::SUB_PROPERTIES.contains(&sub)
}

impl PropertyValue for f32 {
    const KIND: ValueKind = ValueKind::Numeric;
    const SUB_PROPERTIES: &'static [&'static str] = &["value"];

    fn interpolate(&self, to: &Self, t: f32) -> Self {
        interp::lerp_f32(*self, *to, t)
    }

    fn read_sub(&self, sub: &str) -> Option<f32> {
        (sub == "value").then_some(*self)
    }

    fn write_sub(&mut self, sub: &str, v: f32) -> bool {
        if sub != "value" {
            return false;
        }
        *self = v;
        true
    }

    fn to_value(&self) -> Value {
        Value::Numeric(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl PropertyValue for i32 {
    const KIND: ValueKind = ValueKind::Numeric;
    const SUB_PROPERTIES: &'static [&'static str] = &["value"];

    fn interpolate(&self, to: &Self, t: f32) -> Self {
        interp::lerp_f32(*self as f32, *to as f32, t).round() as i32
    }

    fn read_sub(&self, sub: &str) -> Option<f32> {
        (sub == "value").then_some(*self as f32)
    }

    fn write_sub(&mut self, sub: &str, v: f32) -> bool {
        if sub != "value" {
            return false;
        }
        *self = v.round() as i32;
        true
    }

    fn to_value(&self) -> Value {
        Value::Numeric(*self as f32)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Numeric(n) => Some(n.round() as i32),
            _ => None,
        }
    }
}

impl PropertyValue for bool {
    const KIND: ValueKind = ValueKind::Bool;
    const SUB_PROPERTIES: &'static [&'static str] = &["value"];

    fn read_sub(&self, sub: &str) -> Option<f32> {
        (sub == "value").then_some(if *self { 1.0 } else { 0.0 })
    }

    fn write_sub(&mut self, sub: &str, v: f32) -> bool {
        if sub != "value" {
            return false;
        }
        *self = v != 0.0;
        true
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

const COLOR_SUBS: [&str; 4] = ["red", "green", "blue", "alpha"];

impl PropertyValue for Rgba {
    const KIND: ValueKind = ValueKind::Color;
    const SUB_PROPERTIES: &'static [&'static str] = &COLOR_SUBS;

    fn interpolate(&self, to: &Self, t: f32) -> Self {
        interp::lerp_color(*self, *to, t)
    }

    fn read_sub(&self, sub: &str) -> Option<f32> {
        let idx = COLOR_SUBS.iter().position(|s| *s == sub)?;
        Some(self.channels()[idx])
    }

    fn write_sub(&mut self, sub: &str, v: f32) -> bool {
        let Some(idx) = COLOR_SUBS.iter().position(|s| *s == sub) else {
            return false;
        };
        let mut channels = self.channels();
        channels[idx] = v;
        *self = Rgba::from_channels(channels);
        true
    }

    fn to_value(&self) -> Value {
        Value::Color(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl PropertyValue for Vec2 {
    const KIND: ValueKind = ValueKind::Vector;
    const SUB_PROPERTIES: &'static [&'static str] = &["x", "y"];

    fn interpolate(&self, to: &Self, t: f32) -> Self {
        interp::lerp_vec2(*self, *to, t)
    }

    fn read_sub(&self, sub: &str) -> Option<f32> {
        match sub {
            "x" => Some(self.x),
            "y" => Some(self.y),
            _ => None,
        }
    }

    fn write_sub(&mut self, sub: &str, v: f32) -> bool {
        match sub {
            "x" => self.x = v,
            "y" => self.y = v,
            _ => return false,
        }
        true
    }

    fn to_value(&self) -> Value {
        Value::Vector(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

impl PropertyValue for ColorGradient {
    const KIND: ValueKind = ValueKind::Gradient;
    const KEYFRAMES: bool = false;

    fn to_value(&self) -> Value {
        Value::Gradient(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Gradient(g) => Some(g.clone()),
            _ => None,
        }
    }
}

/// Selected member of a named enumeration, e.g. a blend mode or a shape type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumChoice {
    pub ty: String,
    pub member: String,
}

impl EnumChoice {
    pub fn new(ty: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            member: member.into(),
        }
    }
}

impl PropertyValue for EnumChoice {
    const KIND: ValueKind = ValueKind::Enum;
    const KEYFRAMES: bool = false;

    fn to_value(&self) -> Value {
        Value::enum_member(self.ty.clone(), self.member.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Enum { ty, member } => Some(EnumChoice::new(ty.clone(), member.clone())),
            _ => None,
        }
    }
}

/// Reference to a brush by provider and brush type, written as `provider:brush`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrushRef {
    pub provider: String,
    pub brush: String,
}

impl BrushRef {
    pub fn new(provider: impl Into<String>, brush: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            brush: brush.into(),
        }
    }
}

impl fmt::Display for BrushRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.brush)
    }
}

impl PropertyValue for BrushRef {
    const KIND: ValueKind = ValueKind::Text;
    const KEYFRAMES: bool = false;

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Text(s) = value else {
            return None;
        };
        let (provider, brush) = s.split_once(':')?;
        if provider.is_empty() || brush.is_empty() {
            return None;
        }
        Some(BrushRef::new(provider, brush))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_write_one_colour_channel() {
        let mut c = Rgba::new(10, 20, 30, 255);
        assert!(c.write_sub("alpha", 128.0));
        assert_eq!(c, Rgba::new(10, 20, 30, 128));
        assert!(c.write_sub("red", 400.0));
        assert_eq!(c.r, 255);
        assert!(!c.write_sub("hue", 1.0));
    }

    #[test]
    fn it_should_treat_nonzero_as_true() {
        let mut b = false;
        assert!(b.write_sub("value", -0.5));
        assert!(b);
        assert!(b.write_sub("value", 0.0));
        assert!(!b);
    }

    #[test]
    fn it_should_declare_capabilities() {
        assert!(has_sub_property::<Vec2>("y"));
        assert!(!has_sub_property::<ColorGradient>("value"));
        assert!(!has_sub_property::<EnumChoice>("value"));
        assert!(<f32 as PropertyValue>::KEYFRAMES);
        assert!(!<BrushRef as PropertyValue>::KEYFRAMES);
    }

    #[test]
    fn it_should_parse_brush_refs() {
        let r = BrushRef::new("glimmer", "solid");
        assert_eq!(BrushRef::from_value(&r.to_value()), Some(r));
        assert_eq!(BrushRef::from_value(&Value::text("solid")), None);
    }

    #[test]
    fn it_should_round_integers() {
        assert_eq!(0_i32.interpolate(&3, 0.5), 2);
        assert_eq!(i32::from_value(&Value::Numeric(2.6)), Some(3));
    }
}
