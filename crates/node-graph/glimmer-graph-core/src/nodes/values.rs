//! Static value nodes: a single output holding a value fixed at creation.

use glimmer_api_core::{Rgba, Value};
use serde::Deserialize;
use serde_json::json;

use crate::node::{parse_params, EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{EnumType, PinId, PinType};

pub const STATIC_NUMERIC: &str = "static-numeric";
pub const STATIC_BOOLEAN: &str = "static-boolean";
pub const STATIC_TEXT: &str = "static-text";
pub const STATIC_COLOR: &str = "static-color";
pub const STATIC_ENUM: &str = "static-enum";

#[derive(Debug)]
pub struct StaticValueNode {
    kind: &'static str,
    ty: PinType,
    output: PinId,
    value: Value,
}

#[derive(Deserialize)]
struct ValueParams<T> {
    value: T,
}

#[derive(Deserialize)]
struct EnumParams {
    #[serde(rename = "enum")]
    ty: EnumType,
    value: String,
}

impl StaticValueNode {
    fn new(pins: &mut PinSet, kind: &'static str, ty: PinType, value: Value) -> Self {
        let output = pins.create_output("output", ty.clone());
        pins.set_value(output, value.clone());
        Self {
            kind,
            ty,
            output,
            value,
        }
    }

    pub fn numeric(pins: &mut PinSet, value: f32) -> Self {
        Self::new(pins, STATIC_NUMERIC, PinType::Numeric, Value::Numeric(value))
    }

    pub fn boolean(pins: &mut PinSet, value: bool) -> Self {
        Self::new(pins, STATIC_BOOLEAN, PinType::Boolean, Value::Bool(value))
    }

    pub fn text(pins: &mut PinSet, value: impl Into<String>) -> Self {
        Self::new(pins, STATIC_TEXT, PinType::Text, Value::Text(value.into()))
    }

    pub fn color(pins: &mut PinSet, value: Rgba) -> Self {
        Self::new(pins, STATIC_COLOR, PinType::Color, Value::Color(value))
    }

    pub fn enumeration(pins: &mut PinSet, ty: EnumType, member: &str) -> Result<Self, NodeError> {
        if !ty.contains(member) {
            return Err(NodeError::Params(format!(
                "'{member}' is not a member of {}",
                ty.name
            )));
        }
        let value = Value::enum_member(ty.name.clone(), member);
        Ok(Self::new(pins, STATIC_ENUM, PinType::Enum(ty), value))
    }

    pub fn output(&self) -> PinId {
        self.output
    }

    pub(crate) fn build(
        kind: &str,
        pins: &mut PinSet,
        params: &serde_json::Value,
    ) -> Result<Self, NodeError> {
        match kind {
            STATIC_NUMERIC => {
                let p: ValueParams<f32> = parse_params(params)?;
                Ok(Self::numeric(pins, p.value))
            }
            STATIC_BOOLEAN => {
                let p: ValueParams<bool> = parse_params(params)?;
                Ok(Self::boolean(pins, p.value))
            }
            STATIC_TEXT => {
                let p: ValueParams<String> = parse_params(params)?;
                Ok(Self::text(pins, p.value))
            }
            STATIC_COLOR => {
                let p: ValueParams<Rgba> = parse_params(params)?;
                Ok(Self::color(pins, p.value))
            }
            STATIC_ENUM => {
                let p: EnumParams = parse_params(params)?;
                Self::enumeration(pins, p.ty, &p.value)
            }
            other => Err(NodeError::Params(format!("not a static value kind: {other}"))),
        }
    }
}

impl Node for StaticValueNode {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        pins.set_value(self.output, self.value.clone());
        Ok(())
    }

    fn params(&self) -> serde_json::Value {
        match (&self.value, &self.ty) {
            (Value::Enum { member, .. }, PinType::Enum(e)) => json!({ "enum": e, "value": member }),
            (Value::Numeric(v), _) => json!({ "value": v }),
            (Value::Bool(v), _) => json!({ "value": v }),
            (Value::Text(v), _) => json!({ "value": v }),
            (Value::Color(v), _) => json!({ "value": v }),
            _ => serde_json::Value::Null,
        }
    }
}
