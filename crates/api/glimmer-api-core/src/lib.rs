//! glimmer-api-core: the value model shared by node scripts, layer properties and the surface.

pub mod coercion;
pub mod data_model;
pub mod data_path;
pub mod geometry;
pub mod value;

pub use data_model::{DataEntry, DataModel, NoData, ValueSource};
pub use data_path::{DataPath, PathError};
pub use geometry::Rect;
pub use value::{ColorGradient, GradientStop, Rgba, Value, ValueKind, Vec2};
