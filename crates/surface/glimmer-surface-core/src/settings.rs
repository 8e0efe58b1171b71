use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;

/// Runtime render settings. Both values can be changed while the loop runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    pub target_frame_rate: u32,
    /// Texture pixels per surface unit.
    pub render_scale: f32,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            target_frame_rate: 30,
            render_scale: 0.5,
        }
    }
}

impl SurfaceSettings {
    pub fn validate(&self) -> Result<(), SurfaceError> {
        validate_frame_rate(self.target_frame_rate)?;
        validate_render_scale(self.render_scale)
    }

    pub fn frame_interval(&self) -> Duration {
        frame_interval(self.target_frame_rate)
    }
}

pub(crate) fn validate_frame_rate(fps: u32) -> Result<(), SurfaceError> {
    if fps == 0 || fps > 1000 {
        return Err(SurfaceError::InvalidFrameRate(fps));
    }
    Ok(())
}

pub(crate) fn validate_render_scale(scale: f32) -> Result<(), SurfaceError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SurfaceError::InvalidRenderScale(scale));
    }
    Ok(())
}

pub(crate) fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_fill_missing_fields_with_defaults() {
        let s: SurfaceSettings = serde_json::from_str(r#"{"target_frame_rate": 60}"#).unwrap();
        assert_eq!(s.target_frame_rate, 60);
        assert_eq!(s.render_scale, 0.5);
        assert_eq!(SurfaceSettings::default().frame_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn it_should_reject_nonsense() {
        let bad = SurfaceSettings {
            target_frame_rate: 0,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(SurfaceError::InvalidFrameRate(0)));
        assert!(validate_render_scale(f32::NAN).is_err());
        assert!(validate_render_scale(-1.0).is_err());
    }
}
