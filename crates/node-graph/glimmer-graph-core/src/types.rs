//! Identifiers and the pin type lattice shared across the graph crate.

use std::fmt;

use glimmer_api_core::{ColorGradient, Rgba, Value, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Script-local node identifier. The exit node is always [`NodeId::EXIT`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const EXIT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Node-local pin identifier; never reused within one node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u32);

/// Fully qualified pin address inside a script.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRef {
    pub node: NodeId,
    pub pin: PinId,
}

impl PinRef {
    pub fn new(node: NodeId, pin: PinId) -> Self {
        Self { node, pin }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:p{}", self.node, self.pin.0)
    }
}

/// Identifies a node script within a profile's script library.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(pub Uuid);

impl ScriptId {
    pub fn new() -> Self {
        ScriptId(Uuid::new_v4())
    }
}

impl Default for ScriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

/// A named enumeration with an ordered member list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }
}

/// Declared type of a pin. `Any` is the untyped placeholder carried by inferring pins until a
/// connection informs them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    Any,
    Numeric,
    Boolean,
    Text,
    Color,
    Vector,
    Gradient,
    /// Accepts any concrete enumeration.
    AnyEnum,
    Enum(EnumType),
}

impl PinType {
    /// Whether an output of type `self` may feed an input of type `other` (symmetric).
    pub fn is_compatible(&self, other: &PinType) -> bool {
        match (self, other) {
            (PinType::Any, _) | (_, PinType::Any) => true,
            (PinType::AnyEnum, PinType::Enum(_) | PinType::AnyEnum) => true,
            (PinType::Enum(_), PinType::AnyEnum) => true,
            (a, b) => a == b,
        }
    }

    /// Concrete types can inform inferring pins; placeholders cannot.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, PinType::Any | PinType::AnyEnum)
    }

    pub fn default_value(&self) -> Value {
        match self {
            PinType::Any | PinType::AnyEnum => Value::Empty,
            PinType::Numeric => Value::Numeric(0.0),
            PinType::Boolean => Value::Bool(false),
            PinType::Text => Value::Text(String::new()),
            PinType::Color => Value::Color(Rgba::TRANSPARENT),
            PinType::Vector => Value::Vector(Vec2::ZERO),
            PinType::Gradient => Value::Gradient(ColorGradient::default()),
            PinType::Enum(e) => match e.members.first() {
                Some(m) => Value::enum_member(e.name.clone(), m.clone()),
                None => Value::Empty,
            },
        }
    }

    /// Whether `value` is a legal payload for a pin of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (PinType::Any, _) => true,
            (_, Value::Empty) => true,
            (PinType::Numeric, Value::Numeric(_)) => true,
            (PinType::Boolean, Value::Bool(_)) => true,
            (PinType::Text, Value::Text(_)) => true,
            (PinType::Color, Value::Color(_)) => true,
            (PinType::Vector, Value::Vector(_)) => true,
            (PinType::Gradient, Value::Gradient(_)) => true,
            (PinType::AnyEnum, Value::Enum { .. }) => true,
            (PinType::Enum(e), Value::Enum { ty, member }) => e.name == *ty && e.contains(member),
            _ => false,
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinType::Enum(e) => write!(f, "Enum({})", e.name),
            other => write!(f, "{other:?}"),
        }
    }
}
