use glimmer_api_core::ValueKind;
use glimmer_graph_core::ScriptId;
use thiserror::Error;

/// Capability violations raised when configuring a layer property.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("{kind:?} properties do not support keyframes")]
    KeyframesUnsupported { kind: ValueKind },
    #[error("{kind:?} properties do not support data bindings")]
    BindingUnsupported { kind: ValueKind },
    #[error("expected a {expected:?} value, found {found:?}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },
    #[error(transparent)]
    Binding(#[from] BindingError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("unknown sub-property '{sub}', expected one of {available:?}")]
    UnknownSubProperty {
        sub: String,
        available: &'static [&'static str],
    },
    #[error("binding refers to unknown script {0}")]
    UnknownScript(ScriptId),
    #[error("conditional binding has no conditions")]
    NoConditions,
}
