use glimmer_api_core::{coercion::to_float, Value};

use crate::node::{EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{PinId, PinType};

pub const SUM: &str = "sum";
pub const SUBTRACT: &str = "subtract";
pub const MULTIPLY: &str = "multiply";
pub const DIVIDE: &str = "divide";
pub const CLAMP: &str = "clamp";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MathOp {
    Sum,
    Subtract,
    Multiply,
    Divide,
}

impl MathOp {
    pub fn kind(self) -> &'static str {
        match self {
            MathOp::Sum => SUM,
            MathOp::Subtract => SUBTRACT,
            MathOp::Multiply => MULTIPLY,
            MathOp::Divide => DIVIDE,
        }
    }

    /// Division by zero yields 0.
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            MathOp::Sum => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide if b == 0.0 => 0.0,
            MathOp::Divide => a / b,
        }
    }
}

#[derive(Debug)]
pub struct MathNode {
    op: MathOp,
    a: PinId,
    b: PinId,
    output: PinId,
}

impl MathNode {
    pub fn new(pins: &mut PinSet, op: MathOp) -> Self {
        Self {
            op,
            a: pins.create_input("a", PinType::Numeric),
            b: pins.create_input("b", PinType::Numeric),
            output: pins.create_output("output", PinType::Numeric),
        }
    }
}

impl Node for MathNode {
    fn kind(&self) -> &'static str {
        self.op.kind()
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let a = to_float(pins.value(self.a));
        let b = to_float(pins.value(self.b));
        pins.set_value(self.output, Value::Numeric(self.op.apply(a, b)));
        Ok(())
    }
}

#[derive(Debug)]
pub struct ClampNode {
    value: PinId,
    min: PinId,
    max: PinId,
    output: PinId,
}

impl ClampNode {
    pub fn new(pins: &mut PinSet) -> Self {
        Self {
            value: pins.create_input("value", PinType::Numeric),
            min: pins.create_input("min", PinType::Numeric),
            max: pins.create_input("max", PinType::Numeric),
            output: pins.create_output("output", PinType::Numeric),
        }
    }
}

impl Node for ClampNode {
    fn kind(&self) -> &'static str {
        CLAMP
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let v = to_float(pins.value(self.value));
        let lo = to_float(pins.value(self.min));
        let hi = to_float(pins.value(self.max));
        // inverted range pins to the lower bound
        let out = if lo > hi || lo.is_nan() || hi.is_nan() {
            lo
        } else {
            v.clamp(lo, hi)
        };
        pins.set_value(self.output, Value::Numeric(out));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_divide_by_zero_to_zero() {
        assert_eq!(MathOp::Divide.apply(5.0, 0.0), 0.0);
        assert_eq!(MathOp::Divide.apply(5.0, 2.0), 2.5);
    }

    #[test]
    fn it_should_clamp_values() {
        let mut pins = PinSet::new();
        let mut node = ClampNode::new(&mut pins);
        pins.set_value(node.value, Value::Numeric(12.0));
        pins.set_value(node.max, Value::Numeric(10.0));
        node.evaluate(&mut pins, &EvalContext::default()).unwrap();
        assert_eq!(pins.value(node.output), &Value::Numeric(10.0));
    }
}
