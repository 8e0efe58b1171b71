//! Switch on an enum value.
//!
//! The node starts with only `selector` and `output`. Once the selector is connected to a pin
//! carrying a concrete enum type, one case input per member is created and kept in a registry
//! keyed by member name. Disconnecting the selector, or its peer losing the enum type, tears
//! the cases down again.

use glimmer_api_core::Value;
use indexmap::IndexMap;

use crate::node::{EvalContext, Node, NodeError};
use crate::pin::PinSet;
use crate::types::{EnumType, PinId, PinType};

pub const ENUM_SWITCH: &str = "enum-switch";

#[derive(Debug)]
pub struct EnumSwitchNode {
    selector: PinId,
    output: PinId,
    current: Option<EnumType>,
    cases: IndexMap<String, PinId>,
}

impl EnumSwitchNode {
    pub fn new(pins: &mut PinSet) -> Self {
        Self {
            selector: pins.create_input("selector", PinType::AnyEnum),
            output: pins.create_inferred_output("output"),
            current: None,
            cases: IndexMap::new(),
        }
    }

    /// Case pin for an enum member, if the cases are currently materialised.
    pub fn case_pin(&self, member: &str) -> Option<PinId> {
        self.cases.get(member).copied()
    }

    pub fn selector(&self) -> PinId {
        self.selector
    }

    fn rebuild(&mut self, selector_type: &PinType, pins: &mut PinSet) {
        let wanted = match selector_type {
            PinType::Enum(e) => Some(e),
            _ => None,
        };
        if self.current.as_ref() == wanted {
            return;
        }
        for (_, pin) in self.cases.drain(..) {
            pins.remove(pin);
        }
        self.current = wanted.cloned();
        if let Some(e) = &self.current {
            for member in &e.members {
                let pin = pins.create_inferred_input(member);
                self.cases.insert(member.clone(), pin);
            }
        }
    }
}

impl Node for EnumSwitchNode {
    fn kind(&self) -> &'static str {
        ENUM_SWITCH
    }

    fn evaluate(&mut self, pins: &mut PinSet, _ctx: &EvalContext<'_>) -> Result<(), NodeError> {
        let selected = match pins.value(self.selector) {
            Value::Enum { member, .. } => self.cases.get(member.as_str()).copied(),
            _ => None,
        };
        let value = match selected {
            Some(pin) => pins.value(pin).clone(),
            None => pins
                .ty(self.output)
                .map(PinType::default_value)
                .unwrap_or_default(),
        };
        pins.set_value(self.output, value);
        Ok(())
    }

    fn type_groups(&self) -> Vec<Vec<PinId>> {
        let mut group = vec![self.output];
        group.extend(self.cases.values().copied());
        vec![group]
    }

    fn on_connected(&mut self, pin: PinId, peer: &PinType, pins: &mut PinSet) {
        if pin == self.selector {
            self.rebuild(peer, pins);
        }
    }

    fn on_peer_type_changed(&mut self, pin: PinId, peer: &PinType, pins: &mut PinSet) {
        if pin == self.selector {
            self.rebuild(peer, pins);
        }
    }

    fn on_disconnected(&mut self, pin: PinId, pins: &mut PinSet) {
        if pin == self.selector {
            self.rebuild(&PinType::Any, pins);
        }
    }
}
