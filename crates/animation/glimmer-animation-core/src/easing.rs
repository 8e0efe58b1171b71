//! Easing curves applied to keyframe progress and binding smoothing.
//!
//! Curves are evaluated in f64 and map 0 to 0 and 1 to 1; some (elastic, back) overshoot in
//! between.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    /// Holds the start value until the segment ends.
    Step,
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SineIn,
    SineOut,
    SineInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    /// Eased progress for `p` in 0..=1.
    pub fn ease(self, p: f32) -> f32 {
        let p = p as f64;
        let out = match self {
            Easing::Step => p.floor(),
            Easing::Linear => p,
            Easing::QuadraticIn => p * p,
            Easing::QuadraticOut => -(p * (p - 2.0)),
            Easing::QuadraticInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    -2.0 * p * p + 4.0 * p - 1.0
                }
            }
            Easing::CubicIn => p * p * p,
            Easing::CubicOut => {
                let f = p - 1.0;
                f * f * f + 1.0
            }
            Easing::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    let f = 2.0 * p - 2.0;
                    0.5 * f * f * f + 1.0
                }
            }
            Easing::QuarticIn => p * p * p * p,
            Easing::QuarticOut => {
                let f = p - 1.0;
                f * f * f * (1.0 - p) + 1.0
            }
            Easing::QuarticInOut => {
                if p < 0.5 {
                    8.0 * p * p * p * p
                } else {
                    let f = p - 1.0;
                    -8.0 * f * f * f * f + 1.0
                }
            }
            Easing::QuinticIn => p * p * p * p * p,
            Easing::QuinticOut => {
                let f = p - 1.0;
                f * f * f * f * f + 1.0
            }
            Easing::QuinticInOut => {
                if p < 0.5 {
                    16.0 * p * p * p * p * p
                } else {
                    let f = 2.0 * p - 2.0;
                    0.5 * f * f * f * f * f + 1.0
                }
            }
            Easing::SineIn => ((p - 1.0) * FRAC_PI_2).sin() + 1.0,
            Easing::SineOut => (p * FRAC_PI_2).sin(),
            Easing::SineInOut => 0.5 * (1.0 - (p * PI).cos()),
            Easing::CircularIn => 1.0 - (1.0 - p * p).sqrt(),
            Easing::CircularOut => ((2.0 - p) * p).sqrt(),
            Easing::CircularInOut => {
                if p < 0.5 {
                    0.5 * (1.0 - (1.0 - 4.0 * (p * p)).sqrt())
                } else {
                    0.5 * ((-(2.0 * p - 3.0) * (2.0 * p - 1.0)).sqrt() + 1.0)
                }
            }
            Easing::ExponentialIn => {
                if p == 0.0 {
                    p
                } else {
                    2f64.powf(10.0 * (p - 1.0))
                }
            }
            Easing::ExponentialOut => {
                if p == 1.0 {
                    p
                } else {
                    1.0 - 2f64.powf(-10.0 * p)
                }
            }
            Easing::ExponentialInOut => {
                if p == 0.0 || p == 1.0 {
                    p
                } else if p < 0.5 {
                    0.5 * 2f64.powf(20.0 * p - 10.0)
                } else {
                    -0.5 * 2f64.powf(-20.0 * p + 10.0) + 1.0
                }
            }
            Easing::ElasticIn => (13.0 * FRAC_PI_2 * p).sin() * 2f64.powf(10.0 * (p - 1.0)),
            Easing::ElasticOut => {
                (-13.0 * FRAC_PI_2 * (p + 1.0)).sin() * 2f64.powf(-10.0 * p) + 1.0
            }
            Easing::ElasticInOut => {
                if p < 0.5 {
                    0.5 * (13.0 * FRAC_PI_2 * (2.0 * p)).sin() * 2f64.powf(10.0 * (2.0 * p - 1.0))
                } else {
                    0.5 * ((-13.0 * FRAC_PI_2 * (2.0 * p)).sin() * 2f64.powf(-10.0 * (2.0 * p - 1.0))
                        + 2.0)
                }
            }
            Easing::BackIn => back_in(p),
            Easing::BackOut => 1.0 - back_in(1.0 - p),
            Easing::BackInOut => {
                if p < 0.5 {
                    0.5 * back_in(2.0 * p)
                } else {
                    0.5 * (1.0 - back_in(1.0 - (2.0 * p - 1.0))) + 0.5
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - p),
            Easing::BounceOut => bounce_out(p),
            Easing::BounceInOut => {
                if p < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - p * 2.0))
                } else {
                    0.5 * bounce_out(p * 2.0 - 1.0) + 0.5
                }
            }
        };
        out as f32
    }
}

#[inline]
fn back_in(p: f64) -> f64 {
    p * p * p - p * (p * PI).sin()
}

fn bounce_out(p: f64) -> f64 {
    if p < 4.0 / 11.0 {
        121.0 * p * p / 16.0
    } else if p < 8.0 / 11.0 {
        363.0 / 40.0 * p * p - 99.0 / 10.0 * p + 17.0 / 5.0
    } else if p < 9.0 / 10.0 {
        4356.0 / 361.0 * p * p - 35442.0 / 1805.0 * p + 16061.0 / 1805.0
    } else {
        54.0 / 5.0 * p * p - 513.0 / 25.0 * p + 268.0 / 25.0
    }
}
