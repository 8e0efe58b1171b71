//! The node contract.

use glimmer_api_core::{NoData, ValueSource};
use thiserror::Error;

use crate::pin::PinSet;
use crate::types::{PinId, PinType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error("invalid parameters: {0}")]
    Params(String),
    #[error("no data at '{0}'")]
    MissingData(String),
    #[error("{0}")]
    Failed(String),
}

/// Read-only inputs available to every node during one evaluation pass.
pub struct EvalContext<'a> {
    pub data: &'a dyn ValueSource,
}

impl<'a> EvalContext<'a> {
    pub fn new(data: &'a dyn ValueSource) -> Self {
        Self { data }
    }
}

impl Default for EvalContext<'_> {
    fn default() -> Self {
        Self { data: &NoData }
    }
}

/// A unit of computation living inside a [`NodeScript`](crate::NodeScript).
///
/// Nodes hold the ids of the pins they created in their [`PinSet`]; the script owns the set and
/// hands it back on every call. Connection hooks may add or remove pins and change declared
/// types, the script revalidates connections afterwards.
pub trait Node: Send {
    /// Registry name of this node kind.
    fn kind(&self) -> &'static str;

    /// Read inputs and write outputs. Must not change pin types.
    fn evaluate(&mut self, pins: &mut PinSet, ctx: &EvalContext<'_>) -> Result<(), NodeError>;

    /// Groups of inferring pins that always share one type (for example the branches and the
    /// output of an if-node).
    fn type_groups(&self) -> Vec<Vec<PinId>> {
        Vec::new()
    }

    /// A connection was made to `pin`; `peer` is the type of the pin on the other end.
    fn on_connected(&mut self, _pin: PinId, _peer: &PinType, _pins: &mut PinSet) {}

    /// A connection on `pin` was removed.
    fn on_disconnected(&mut self, _pin: PinId, _pins: &mut PinSet) {}

    /// The pin on the other end of a connection to `pin` changed type.
    fn on_peer_type_changed(&mut self, _pin: PinId, _peer: &PinType, _pins: &mut PinSet) {}

    /// Parameters needed to recreate this node through the registry.
    fn params(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Parse node parameters, mapping failures to [`NodeError::Params`].
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
) -> Result<T, NodeError> {
    serde_json::from_value(params.clone()).map_err(|e| NodeError::Params(e.to_string()))
}
