use std::sync::Arc;
use std::time::Duration;

use glimmer_api_core::Rgba;

use crate::canvas::Canvas;
use crate::texture::Texture;

/// Draws one frame. Called on the render thread with the render lock held.
pub trait Renderer: Send {
    /// Draw into `canvas`, already scaled to surface units and cleared to black.
    fn render(&mut self, canvas: &mut dyn Canvas, delta: Duration) -> anyhow::Result<()>;

    /// Inspect the finished texture before it is mapped onto the leds.
    fn post_render(&mut self, _texture: &Texture) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Snapshot of a completed frame for previews.
#[derive(Clone, Debug)]
pub struct FrameInfo {
    pub frame: u64,
    pub width: u32,
    pub height: u32,
    pub delta: Duration,
    pub pixels: Arc<[Rgba]>,
}

#[derive(Clone, Debug)]
pub enum SurfaceEvent {
    FrameRendered(FrameInfo),
    LedsChanged { led_count: usize },
}
