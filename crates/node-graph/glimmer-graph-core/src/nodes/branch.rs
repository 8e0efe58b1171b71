//! If-node: routes one of two inputs to its output depending on a condition.
//!
//! `true`, `false` and `output` infer a single shared type. Whichever of them is first
//! connected to a typed pin fixes that type for all three; once no typed peer informs the
//! group any more they fall back to [`PinType::Any`].

use glimmer_api_core::coercion::to_bool;

use crate::node::{EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{PinId, PinType};

pub const BRANCH: &str = "branch";

#[derive(Debug)]
pub struct BranchNode {
    condition: PinId,
    on_true: PinId,
    on_false: PinId,
    output: PinId,
}

impl BranchNode {
    pub fn new(pins: &mut PinSet) -> Self {
        Self {
            condition: pins.create_input("condition", PinType::Boolean),
            on_true: pins.create_inferred_input("true"),
            on_false: pins.create_inferred_input("false"),
            output: pins.create_inferred_output("output"),
        }
    }
}

impl Node for BranchNode {
    fn kind(&self) -> &'static str {
        BRANCH
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let source = if to_bool(pins.value(self.condition)) {
            self.on_true
        } else {
            self.on_false
        };
        let value = pins.value(source).clone();
        pins.set_value(self.output, value);
        Ok(())
    }

    fn type_groups(&self) -> Vec<Vec<PinId>> {
        vec![vec![self.on_true, self.on_false, self.output]]
    }
}
