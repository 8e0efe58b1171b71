//! Graphics contexts create the canvases frames are drawn into.

use crate::canvas::{Canvas, SoftwareCanvas};
use crate::error::SurfaceError;

/// Largest texture side any context is asked for.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

/// Render backend injected into the [`SurfaceManager`](crate::SurfaceManager).
pub trait GraphicsContext: Send + Sync {
    fn name(&self) -> &str;

    fn create_canvas(&self, width: u32, height: u32) -> Result<Box<dyn Canvas>, SurfaceError>;

    fn max_texture_size(&self) -> u32 {
        MAX_TEXTURE_SIZE
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareContext;

impl GraphicsContext for SoftwareContext {
    fn name(&self) -> &str {
        "software"
    }

    fn create_canvas(&self, width: u32, height: u32) -> Result<Box<dyn Canvas>, SurfaceError> {
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(SurfaceError::CanvasCreation {
                context: self.name().to_string(),
                width,
                height,
                reason: format!("sides must be within 1..={MAX_TEXTURE_SIZE}"),
            });
        }
        Ok(Box::new(SoftwareCanvas::new(width, height)))
    }
}
