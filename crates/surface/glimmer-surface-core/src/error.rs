use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("graphics context '{context}' cannot create a {width}x{height} canvas: {reason}")]
    CanvasCreation {
        context: String,
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("invalid render scale {0}")]
    InvalidRenderScale(f32),
    #[error("invalid target frame rate {0}")]
    InvalidFrameRate(u32),
    #[error("failed to start the render thread: {0}")]
    Spawn(String),
}
