//! Serialized form of a node script, as supplied by the profile loader.

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, PinType, ScriptId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScriptData {
    #[serde(default)]
    pub id: Option<ScriptId>,
    pub name: String,
    pub result_type: PinType,
    /// Every node except the exit node, which always has id 0.
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    /// Applied in order; a switch selector must be connected before its cases.
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub from_node: NodeId,
    pub from_pin: String,
    pub to_node: NodeId,
    pub to_pin: String,
}
