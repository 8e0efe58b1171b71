//! Interpolation helpers shared by the keyframe engine and binding smoothing.
//!
//! Blends use `a * (1 - t) + b * t` so `t = 0` yields exactly `a` and `t = 1` exactly `b`.

use glimmer_api_core::{Rgba, Vec2};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp_f32(a.x, b.x, t), lerp_f32(a.y, b.y, t))
}

/// Channel-wise colour blend, clamped to 0..=255 after interpolation.
#[inline]
pub fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    a.lerp(b, t)
}

/// Step semantics: hold `a` until the segment completes.
#[inline]
pub fn step<T: Clone>(a: &T, b: &T, t: f32) -> T {
    if t >= 1.0 {
        b.clone()
    } else {
        a.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_hit_boundaries_exactly() {
        let (a, b) = (0.1_f32, 0.7_f32);
        assert_eq!(lerp_f32(a, b, 0.0), a);
        assert_eq!(lerp_f32(a, b, 1.0), b);
        assert_eq!(lerp_f32(0.0, 10.0, 0.5), 5.0);
    }

    #[test]
    fn it_should_clamp_colour_overshoot() {
        let c = lerp_color(Rgba::BLACK, Rgba::WHITE, 1.5);
        assert_eq!(c, Rgba::WHITE);
        let c = lerp_color(Rgba::WHITE, Rgba::BLACK, 1.5);
        assert_eq!(c.r, 0);
    }

    #[test]
    fn it_should_step_at_the_end() {
        assert!(!step(&false, &true, 0.99));
        assert!(step(&false, &true, 1.0));
    }
}
