//! Built-in node catalogue.

pub mod branch;
pub mod data_source;
pub mod enum_switch;
pub mod exit;
pub mod logic;
pub mod math;
pub mod values;

pub use branch::BranchNode;
pub use data_source::DataModelNode;
pub use enum_switch::EnumSwitchNode;
pub use exit::ExitNode;
pub use logic::{BoolNode, BoolOp, CompareNode, CompareOp, EqualsNode, NotNode};
pub use math::{ClampNode, MathNode, MathOp};
pub use values::StaticValueNode;

use crate::node::Node;
use crate::registry::NodeRegistry;

fn boxed<N: Node + 'static>(node: N) -> Box<dyn Node> {
    Box::new(node)
}

pub(crate) fn register_builtins(reg: &mut NodeRegistry) {
    for kind in [
        values::STATIC_NUMERIC,
        values::STATIC_BOOLEAN,
        values::STATIC_TEXT,
        values::STATIC_COLOR,
        values::STATIC_ENUM,
    ] {
        reg.register(kind, move |pins, params| {
            StaticValueNode::build(kind, pins, params).map(boxed)
        });
    }

    reg.register(data_source::DATA_MODEL, |pins, params| {
        DataModelNode::build(pins, params).map(boxed)
    });

    for op in [MathOp::Sum, MathOp::Subtract, MathOp::Multiply, MathOp::Divide] {
        reg.register(op.kind(), move |pins, _| Ok(boxed(MathNode::new(pins, op))));
    }
    reg.register(math::CLAMP, |pins, _| Ok(boxed(ClampNode::new(pins))));

    reg.register(logic::AND, |pins, _| Ok(boxed(BoolNode::new(pins, BoolOp::And))));
    reg.register(logic::OR, |pins, _| Ok(boxed(BoolNode::new(pins, BoolOp::Or))));
    reg.register(logic::NOT, |pins, _| Ok(boxed(NotNode::new(pins))));
    reg.register(logic::EQUALS, |pins, _| Ok(boxed(EqualsNode::new(pins))));
    reg.register(logic::GREATER_THAN, |pins, _| {
        Ok(boxed(CompareNode::new(pins, CompareOp::GreaterThan)))
    });
    reg.register(logic::LESS_THAN, |pins, _| {
        Ok(boxed(CompareNode::new(pins, CompareOp::LessThan)))
    });

    reg.register(branch::BRANCH, |pins, _| Ok(boxed(BranchNode::new(pins))));
    reg.register(enum_switch::ENUM_SWITCH, |pins, _| {
        Ok(boxed(EnumSwitchNode::new(pins)))
    });
}
