//! glimmer-surface-core: the render loop.
//!
//! A [`SurfaceManager`] ticks a [`Renderer`] at a fixed frame rate, rasterizes each frame into
//! a [`Texture`] sized to the enabled devices and maps the texture onto every led through a
//! [`LedGroup`]. Graphics backends plug in through [`GraphicsContext`]; [`SoftwareContext`]
//! renders on the CPU.

pub mod canvas;
pub mod context;
pub mod device;
pub mod error;
pub mod manager;
pub mod renderer;
pub mod settings;
pub mod texture;
pub mod trigger;

pub use canvas::{Canvas, SoftwareCanvas};
pub use context::{GraphicsContext, SoftwareContext, MAX_TEXTURE_SIZE};
pub use device::{surface_bounds, Device, DeviceId, DeviceOutput, Led, LedColor, NullOutput};
pub use error::SurfaceError;
pub use manager::{FrameStats, SurfaceManager};
pub use renderer::{FrameInfo, Renderer, SurfaceEvent};
pub use settings::SurfaceSettings;
pub use texture::{texture_size, LedGroup, Texture, TextureSize};
pub use trigger::UpdateTrigger;
