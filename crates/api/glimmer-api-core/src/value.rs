//! Value: runtime instances carried by pins, data model entries and layer properties.
//! Numeric channels use f32; colour channels are stored as bytes.

use serde::{Deserialize, Serialize};

/// Lightweight kind enum for quick dispatch without matching payloads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Empty,
    Numeric,
    Bool,
    Text,
    Color,
    Vector,
    Gradient,
    Enum,
}

/// 8-bit RGBA colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Channels as floats in the 0..=255 range, ordered r, g, b, a.
    #[inline]
    pub fn channels(self) -> [f32; 4] {
        [self.r as f32, self.g as f32, self.b as f32, self.a as f32]
    }

    /// Build a colour from float channels, rounding and clamping each to 0..=255.
    #[inline]
    pub fn from_channels(c: [f32; 4]) -> Self {
        Self {
            r: clamp_channel(c[0]),
            g: clamp_channel(c[1]),
            b: clamp_channel(c[2]),
            a: clamp_channel(c[3]),
        }
    }

    /// Channel-wise linear blend; `t` is not clamped but the result is.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let a = self.channels();
        let b = other.channels();
        Rgba::from_channels([
            a[0] * (1.0 - t) + b[0] * t,
            a[1] * (1.0 - t) + b[1] * t,
            a[2] * (1.0 - t) + b[2] * t,
            a[3] * (1.0 - t) + b[3] * t,
        ])
    }

    /// Source-over composition of `self` on top of `dst`.
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let sa = a as f32 / 255.0;
                let da = dst.a as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                let blend = |s: u8, d: u8| {
                    let s = s as f32 / 255.0;
                    let d = d as f32 / 255.0;
                    (s * sa + d * da * (1.0 - sa)) / out_a * 255.0
                };
                Rgba::from_channels([
                    blend(self.r, dst.r),
                    blend(self.g, dst.g),
                    blend(self.b, dst.b),
                    out_a * 255.0,
                ])
            }
        }
    }
}

#[inline]
fn clamp_channel(v: f32) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

/// Two-component vector used for positions, sizes and scales.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0..=1.
    pub position: f32,
    pub color: Rgba,
}

/// Ordered list of colour stops.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorGradient {
    pub stops: Vec<GradientStop>,
}

impl ColorGradient {
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    /// Sample the gradient at `position`. Positions outside the stop range clamp to the
    /// nearest stop; an empty gradient is transparent.
    pub fn color_at(&self, position: f32) -> Rgba {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Rgba::TRANSPARENT,
        };
        if position <= first.position {
            return first.color;
        }
        if position >= last.position {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if position >= a.position && position <= b.position {
                let span = b.position - a.position;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (position - a.position) / span);
            }
        }
        last.color
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// No value yet (unconnected, untyped pins).
    #[default]
    Empty,

    /// Scalar
    Numeric(f32),

    Bool(bool),

    /// Text; never interpolated
    Text(String),

    Color(Rgba),

    /// 2D vector
    Vector(Vec2),

    Gradient(ColorGradient),

    /// Member of a named enumeration
    Enum { ty: String, member: String },
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Numeric(_) => ValueKind::Numeric,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
            Value::Color(_) => ValueKind::Color,
            Value::Vector(_) => ValueKind::Vector,
            Value::Gradient(_) => ValueKind::Gradient,
            Value::Enum { .. } => ValueKind::Enum,
        }
    }

    pub fn num(v: f32) -> Self {
        Value::Numeric(v)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn enum_member(ty: impl Into<String>, member: impl Into<String>) -> Self {
        Value::Enum {
            ty: ty.into(),
            member: member.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_lerp_hits_both_ends_exactly() {
        let a = Rgba::new(10, 20, 30, 40);
        let b = Rgba::new(200, 100, 0, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn color_channels_clamp_when_overshooting() {
        let a = Rgba::new(0, 0, 0, 0);
        let b = Rgba::new(200, 255, 10, 255);
        let out = a.lerp(b, 1.5);
        assert_eq!(out.g, 255);
        let under = a.lerp(b, -0.5);
        assert_eq!(under, Rgba::TRANSPARENT);
    }

    #[test]
    fn gradient_samples_between_stops() {
        let g = ColorGradient::new(vec![
            GradientStop {
                position: 1.0,
                color: Rgba::opaque(255, 0, 0),
            },
            GradientStop {
                position: 0.0,
                color: Rgba::opaque(0, 0, 0),
            },
        ]);
        assert_eq!(g.color_at(-1.0), Rgba::opaque(0, 0, 0));
        assert_eq!(g.color_at(0.5), Rgba::opaque(128, 0, 0));
        assert_eq!(g.color_at(2.0), Rgba::opaque(255, 0, 0));
        assert_eq!(ColorGradient::default().color_at(0.3), Rgba::TRANSPARENT);
    }

    #[test]
    fn over_respects_alpha() {
        let dst = Rgba::opaque(0, 0, 255);
        assert_eq!(Rgba::opaque(255, 0, 0).over(dst), Rgba::opaque(255, 0, 0));
        assert_eq!(Rgba::TRANSPARENT.over(dst), dst);
        let half = Rgba::new(255, 0, 0, 128).over(dst);
        assert_eq!(half.a, 255);
        assert!(half.r > 120 && half.b > 120);
    }

    #[test]
    fn value_serializes_with_type_tag() {
        let v = Value::Numeric(1.5);
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["type"], "Numeric");
        let back: Value = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, v);
    }
}
