//! Keyframes and bracket lookup.

use std::time::Duration;

use crate::easing::Easing;
use crate::value::PropertyValue;

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Offset from the start of the layer timeline.
    pub position: Duration,
    pub value: T,
    /// Easing applied on the segment that starts at this keyframe.
    pub easing: Easing,
}

impl<T> Keyframe<T> {
    pub fn new(position: Duration, value: T, easing: Easing) -> Self {
        Self {
            position,
            value,
            easing,
        }
    }

    pub fn linear(position: Duration, value: T) -> Self {
        Self::new(position, value, Easing::Linear)
    }
}

/// Where a property sits relative to its keyframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyframeState {
    Disabled,
    NoKeyframes,
    BeforeFirst,
    Between { from: usize, to: usize },
    AfterLast,
}

/// Locate `progress` in position-ordered `keyframes`.
///
/// `to` is the first keyframe strictly after `progress` and `from` its predecessor, so with
/// duplicate positions the later duplicate starts the next segment.
pub fn locate<T>(keyframes: &[Keyframe<T>], progress: Duration) -> KeyframeState {
    if keyframes.is_empty() {
        return KeyframeState::NoKeyframes;
    }
    match keyframes.iter().position(|k| k.position > progress) {
        None => KeyframeState::AfterLast,
        Some(0) => KeyframeState::BeforeFirst,
        Some(to) => KeyframeState::Between { from: to - 1, to },
    }
}

/// Value of `keyframes` at `state`; `None` when the state does not come from keyframes.
pub fn sample<T: PropertyValue>(
    keyframes: &[Keyframe<T>],
    state: KeyframeState,
    progress: Duration,
) -> Option<T> {
    match state {
        KeyframeState::Disabled | KeyframeState::NoKeyframes => None,
        KeyframeState::BeforeFirst => keyframes.first().map(|k| k.value.clone()),
        KeyframeState::AfterLast => keyframes.last().map(|k| k.value.clone()),
        KeyframeState::Between { from, to } => {
            let (a, b) = (keyframes.get(from)?, keyframes.get(to)?);
            let span = b.position.saturating_sub(a.position).as_secs_f64();
            let t = if span > 0.0 {
                (progress.saturating_sub(a.position).as_secs_f64() / span).min(1.0) as f32
            } else {
                1.0
            };
            Some(a.value.interpolate(&b.value, a.easing.ease(t)))
        }
    }
}

/// Insert keeping position order; equal positions go after existing ones.
pub(crate) fn insert_sorted<T>(keyframes: &mut Vec<Keyframe<T>>, keyframe: Keyframe<T>) -> usize {
    let idx = keyframes.partition_point(|k| k.position <= keyframe.position);
    keyframes.insert(idx, keyframe);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    fn frames() -> Vec<Keyframe<f32>> {
        vec![
            Keyframe::linear(secs(0.0), 0.0),
            Keyframe::linear(secs(2.0), 10.0),
        ]
    }

    #[test]
    fn it_should_interpolate_between_brackets() {
        let k = frames();
        let state = locate(&k, secs(1.0));
        assert_eq!(state, KeyframeState::Between { from: 0, to: 1 });
        assert_eq!(sample(&k, state, secs(1.0)), Some(5.0));
    }

    #[test]
    fn it_should_clamp_a_stale_bracket() {
        let k = frames();
        let stale = KeyframeState::Between { from: 1, to: 1 };
        assert_eq!(sample(&k, stale, secs(1.0)), Some(10.0));
        let behind = KeyframeState::Between { from: 0, to: 1 };
        assert_eq!(sample(&k, behind, secs(5.0)), Some(10.0));
    }

    #[test]
    fn it_should_clamp_outside_the_range() {
        let k = vec![
            Keyframe::linear(secs(1.0), 3.0_f32),
            Keyframe::linear(secs(2.0), 4.0),
        ];
        let before = locate(&k, secs(0.5));
        assert_eq!(before, KeyframeState::BeforeFirst);
        assert_eq!(sample(&k, before, secs(0.5)), Some(3.0));
        let after = locate(&k, secs(5.0));
        assert_eq!(after, KeyframeState::AfterLast);
        assert_eq!(sample(&k, after, secs(5.0)), Some(4.0));
    }

    #[test]
    fn it_should_hit_exact_boundaries() {
        let k = vec![
            Keyframe::new(secs(0.0), 0.3_f32, Easing::CubicInOut),
            Keyframe::linear(secs(1.0), 0.9),
        ];
        let at_start = locate(&k, secs(0.0));
        assert_eq!(sample(&k, at_start, secs(0.0)), Some(0.3));
        let at_end = locate(&k, secs(1.0));
        assert_eq!(at_end, KeyframeState::AfterLast);
        assert_eq!(sample(&k, at_end, secs(1.0)), Some(0.9));
    }

    #[test]
    fn it_should_jump_on_duplicate_positions() {
        let k = vec![
            Keyframe::linear(secs(0.0), 0.0_f32),
            Keyframe::linear(secs(1.0), 1.0),
            Keyframe::linear(secs(1.0), 5.0),
            Keyframe::linear(secs(2.0), 6.0),
        ];
        let state = locate(&k, secs(1.0));
        assert_eq!(state, KeyframeState::Between { from: 2, to: 3 });
        assert_eq!(sample(&k, state, secs(1.0)), Some(5.0));
    }

    #[test]
    fn it_should_keep_insertion_order_for_equal_positions() {
        let mut k = frames();
        let idx = insert_sorted(&mut k, Keyframe::linear(secs(2.0), 20.0));
        assert_eq!(idx, 2);
        let idx = insert_sorted(&mut k, Keyframe::linear(secs(1.0), 1.0));
        assert_eq!(idx, 1);
        assert_eq!(locate(&[] as &[Keyframe<f32>], secs(1.0)), KeyframeState::NoKeyframes);
    }
}
