//! glimmer-graph-core: typed node scripts.
//!
//! A [`NodeScript`] is an acyclic graph of [`Node`]s whose typed pins are joined by connections.
//! Pins can infer their type from what they are connected to, and some nodes grow or shed pins
//! as their connections change. Scripts evaluate every node once per call in dependency order,
//! isolating failures to the node that raised them.

pub mod data;
pub mod error;
mod infer;
pub mod node;
pub mod nodes;
pub mod pin;
pub mod registry;
pub mod script;
pub mod topo;
pub mod types;

pub use data::{ConnectionData, NodeData, NodeScriptData};
pub use error::GraphError;
pub use node::{EvalContext, Node, NodeError};
pub use pin::{Pin, PinEvent, PinSet};
pub use registry::NodeRegistry;
pub use script::{Connection, EvalReport, NodeFault, NodeScript, NodeSlot};
pub use types::{EnumType, NodeId, PinDirection, PinId, PinRef, PinType, ScriptId};
