//! glimmer-profile-core: profiles and the layers they draw.
//!
//! A [`Profile`] is a tree of [`Folder`]s and [`Layer`]s loaded from a [`ProfileDescriptor`].
//! Each element carries a display condition or event trigger and a timeline; each layer draws a
//! shape with a brush whose settings are animatable properties, wrapped by its ordered effects.
//! [`ProfileRenderer`] ticks and draws the active profiles from the surface render loop.

pub mod brush;
pub mod descriptor;
pub mod effect;
pub mod element;
pub mod error;
pub mod folder;
pub mod layer;
pub mod profile;
pub mod renderer;
pub mod scripts;

pub use brush::{Brush, BrushRegistry, GradientBrush, Paint, SolidBrush, BUILTIN_PROVIDER};
pub use descriptor::{
    DisplayDescriptor, EffectDescriptor, ElementDescriptor, EventOverlap, EventTrigger,
    FolderDescriptor, LayerDescriptor, ProfileDescriptor,
};
pub use effect::{DimEffect, EffectInstance, EffectRegistry, LayerEffect, TintEffect};
pub use element::{DisplayState, ProfileElement};
pub use error::ProfileError;
pub use folder::Folder;
pub use layer::{Layer, LayerProperties, Shape, SHAPE_ENUM};
pub use profile::Profile;
pub use renderer::ProfileRenderer;
pub use scripts::ScriptLibrary;
