use glimmer_api_core::{
    coercion::{to_bool, to_float},
    Value,
};

use crate::node::{EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{PinId, PinType};

pub const AND: &str = "and";
pub const OR: &str = "or";
pub const NOT: &str = "not";
pub const EQUALS: &str = "equals";
pub const GREATER_THAN: &str = "greater-than";
pub const LESS_THAN: &str = "less-than";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug)]
pub struct BoolNode {
    op: BoolOp,
    a: PinId,
    b: PinId,
    output: PinId,
}

impl BoolNode {
    pub fn new(pins: &mut PinSet, op: BoolOp) -> Self {
        Self {
            op,
            a: pins.create_input("a", PinType::Boolean),
            b: pins.create_input("b", PinType::Boolean),
            output: pins.create_output("output", PinType::Boolean),
        }
    }
}

impl Node for BoolNode {
    fn kind(&self) -> &'static str {
        match self.op {
            BoolOp::And => AND,
            BoolOp::Or => OR,
        }
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let a = to_bool(pins.value(self.a));
        let b = to_bool(pins.value(self.b));
        let out = match self.op {
            BoolOp::And => a && b,
            BoolOp::Or => a || b,
        };
        pins.set_value(self.output, Value::Bool(out));
        Ok(())
    }
}

#[derive(Debug)]
pub struct NotNode {
    input: PinId,
    output: PinId,
}

impl NotNode {
    pub fn new(pins: &mut PinSet) -> Self {
        Self {
            input: pins.create_input("input", PinType::Boolean),
            output: pins.create_output("output", PinType::Boolean),
        }
    }
}

impl Node for NotNode {
    fn kind(&self) -> &'static str {
        NOT
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let v = !to_bool(pins.value(self.input));
        pins.set_value(self.output, Value::Bool(v));
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
}

#[derive(Debug)]
pub struct CompareNode {
    op: CompareOp,
    a: PinId,
    b: PinId,
    output: PinId,
}

impl CompareNode {
    pub fn new(pins: &mut PinSet, op: CompareOp) -> Self {
        Self {
            op,
            a: pins.create_input("a", PinType::Numeric),
            b: pins.create_input("b", PinType::Numeric),
            output: pins.create_output("output", PinType::Boolean),
        }
    }
}

impl Node for CompareNode {
    fn kind(&self) -> &'static str {
        match self.op {
            CompareOp::GreaterThan => GREATER_THAN,
            CompareOp::LessThan => LESS_THAN,
        }
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let a = to_float(pins.value(self.a));
        let b = to_float(pins.value(self.b));
        let out = match self.op {
            CompareOp::GreaterThan => a > b,
            CompareOp::LessThan => a < b,
        };
        pins.set_value(self.output, Value::Bool(out));
        Ok(())
    }
}

/// Compares two values of whatever type its inputs get connected to.
#[derive(Debug)]
pub struct EqualsNode {
    a: PinId,
    b: PinId,
    output: PinId,
}

impl EqualsNode {
    pub fn new(pins: &mut PinSet) -> Self {
        Self {
            a: pins.create_inferred_input("a"),
            b: pins.create_inferred_input("b"),
            output: pins.create_output("output", PinType::Boolean),
        }
    }
}

impl Node for EqualsNode {
    fn kind(&self) -> &'static str {
        EQUALS
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let eq = match (pins.value(self.a), pins.value(self.b)) {
            (Value::Numeric(a), Value::Numeric(b)) => (a - b).abs() <= f32::EPSILON,
            (a, b) => a == b,
        };
        pins.set_value(self.output, Value::Bool(eq));
        Ok(())
    }

    fn type_groups(&self) -> Vec<Vec<PinId>> {
        vec![vec![self.a, self.b]]
    }
}
