use thiserror::Error;

use crate::node::NodeError;
use crate::types::{NodeId, PinRef, PinType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown pin {0}")]
    UnknownPin(PinRef),
    #[error("node {node} has no {direction} pin named '{name}'")]
    UnknownPinName {
        node: NodeId,
        name: String,
        direction: &'static str,
    },
    #[error("connections must run from an output pin to an input pin")]
    Direction,
    #[error("cannot connect {from} to {to}: {from_type} is not compatible with {to_type}")]
    IncompatibleTypes {
        from: PinRef,
        to: PinRef,
        from_type: PinType,
        to_type: PinType,
    },
    #[error("connecting {from} to {to} would create a cycle")]
    Cycle { from: PinRef, to: PinRef },
    #[error("the exit node cannot be removed")]
    ExitNode,
    #[error("node id {0} is already in use")]
    DuplicateNode(NodeId),
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),
    #[error("failed to create '{kind}' node: {source}")]
    Create {
        kind: String,
        #[source]
        source: NodeError,
    },
}
