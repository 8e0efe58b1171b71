//! glimmer-animation-core: keyframes, easing, data bindings and layer property composition.
//!
//! A [`LayerProperty`] starts from its base value, optionally replaces it with the keyframed
//! value at the current timeline position and finally lets a [`DataBinding`] override one
//! sub-property from external data or a node script result.

pub mod binding;
pub mod easing;
pub mod error;
pub mod interp;
pub mod keyframe;
pub mod modifier;
pub mod property;
mod serde_ms;
pub mod timeline;
pub mod value;

pub use binding::{
    BindingCondition, BindingContext, BindingMode, BindingSmoothing, BindingSource, DataBinding,
    NoScripts, ScriptResults,
};
pub use easing::Easing;
pub use error::{BindingError, PropertyError};
pub use keyframe::{Keyframe, KeyframeState};
pub use modifier::{Modifier, ModifierKind, ModifierParam};
pub use property::{DynProperty, KeyframeData, LayerProperty, PropertyData};
pub use timeline::{PlayMode, Timeline, TimelineData};
pub use value::{BrushRef, EnumChoice, PropertyValue};
