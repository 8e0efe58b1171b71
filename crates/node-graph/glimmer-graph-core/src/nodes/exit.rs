use crate::node::{EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{PinId, PinType};

pub const EXIT: &str = "exit";

/// Terminal node of every script; its input holds the script result.
#[derive(Debug)]
pub struct ExitNode {
    input: PinId,
}

impl ExitNode {
    pub fn new(pins: &mut PinSet, result_type: PinType) -> Self {
        Self {
            input: pins.create_input("result", result_type),
        }
    }

    pub fn input(&self) -> PinId {
        self.input
    }
}

impl Node for ExitNode {
    fn kind(&self) -> &'static str {
        EXIT
    }

    fn evaluate(&mut self, _pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        Ok(())
    }
}
