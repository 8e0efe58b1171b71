use glimmer_animation_core::PropertyError;
use glimmer_graph_core::{GraphError, PinType, ScriptId};
use thiserror::Error;

/// Raised while turning a descriptor into a profile. A profile either loads completely or not
/// at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("failed to load script '{name}': {source}")]
    Script {
        name: String,
        #[source]
        source: GraphError,
    },
    #[error("script {0} is defined more than once")]
    DuplicateScript(ScriptId),
    #[error("'{element}' references unknown script {script}")]
    UnknownScript { element: String, script: ScriptId },
    #[error("'{element}' uses script {script} as a display condition but it yields {found:?}")]
    ConditionType {
        element: String,
        script: ScriptId,
        found: PinType,
    },
    #[error("layer '{element}' has no property '{property}'")]
    UnknownProperty { element: String, property: String },
    #[error("property '{element}.{property}': {source}")]
    Property {
        element: String,
        property: String,
        #[source]
        source: PropertyError,
    },
    #[error("layer '{element}' uses unknown brush '{brush}'")]
    UnknownBrush { element: String, brush: String },
    #[error("layer '{element}' uses unknown effect '{effect}'")]
    UnknownEffect { element: String, effect: String },
}
