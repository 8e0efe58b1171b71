//! Coercion helpers between Value kinds.
//! Used when a data binding reads its driving value and when nodes accept loosely typed inputs.

use crate::{Rgba, Value, Vec2};

/// Attempt to coerce a Value into a scalar f32.
/// Rules:
/// - Numeric -> its value
/// - Bool -> 1.0 / 0.0
/// - Text -> parsed if it is a number
/// - Vector -> x component
/// - everything else -> None
pub fn try_float(v: &Value) -> Option<f32> {
    match v {
        Value::Numeric(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f32>().ok(),
        Value::Vector(v) => Some(v.x),
        Value::Empty | Value::Color(_) | Value::Gradient(_) | Value::Enum { .. } => None,
    }
}

/// Like [`try_float`] but falls back to 0.0.
pub fn to_float(v: &Value) -> f32 {
    try_float(v).unwrap_or(0.0)
}

/// Truthiness: non-zero numbers, `true`, non-empty text.
pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Numeric(f) => *f != 0.0,
        Value::Text(s) => !s.is_empty(),
        Value::Empty => false,
        _ => true,
    }
}

/// Colour view of a value. Numbers become grey levels in 0..=255, gradients yield their
/// first stop.
pub fn to_color(v: &Value) -> Rgba {
    match v {
        Value::Color(c) => *c,
        Value::Numeric(f) => {
            let c = Rgba::from_channels([*f, *f, *f, 255.0]);
            Rgba::opaque(c.r, c.g, c.b)
        }
        Value::Bool(true) => Rgba::WHITE,
        Value::Gradient(g) => g.color_at(0.0),
        _ => Rgba::BLACK,
    }
}

/// Scalars broadcast to both components.
pub fn to_vec2(v: &Value) -> Vec2 {
    match v {
        Value::Vector(v) => *v,
        other => match try_float(other) {
            Some(f) => Vec2::new(f, f),
            None => Vec2::ZERO,
        },
    }
}

pub fn to_text(v: &Value) -> String {
    match v {
        Value::Empty => String::new(),
        Value::Numeric(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
        Value::Color(c) => format!("#{:02X}{:02X}{:02X}{:02X}", c.a, c.r, c.g, c.b),
        Value::Vector(v) => format!("{}, {}", v.x, v.y),
        Value::Gradient(g) => format!("gradient({} stops)", g.stops.len()),
        Value::Enum { member, .. } => member.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_from_loose_values() {
        assert_eq!(try_float(&Value::Numeric(2.5)), Some(2.5));
        assert_eq!(try_float(&Value::Bool(true)), Some(1.0));
        assert_eq!(try_float(&Value::text(" 3 ")), Some(3.0));
        assert_eq!(try_float(&Value::text("abc")), None);
        assert_eq!(try_float(&Value::Empty), None);
        assert_eq!(to_float(&Value::Color(Rgba::WHITE)), 0.0);
    }

    #[test]
    fn truthiness() {
        assert!(to_bool(&Value::Numeric(-1.0)));
        assert!(!to_bool(&Value::Numeric(0.0)));
        assert!(!to_bool(&Value::Empty));
        assert!(to_bool(&Value::text("x")));
    }

    #[test]
    fn colour_and_vector_views() {
        assert_eq!(to_color(&Value::Numeric(300.0)), Rgba::WHITE);
        assert_eq!(to_vec2(&Value::Numeric(2.0)), Vec2::new(2.0, 2.0));
        assert_eq!(to_text(&Value::Color(Rgba::opaque(255, 0, 16))), "#FFFF0010");
    }
}
