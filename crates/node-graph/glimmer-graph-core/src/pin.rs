//! Pins and the per-node pin arena.
//!
//! Every node owns a [`PinSet`]. Pins are created and removed only through it, and every
//! structural or type change is recorded as a [`PinEvent`] that the owning script drains to
//! revalidate connections and refresh its evaluation order.

use glimmer_api_core::Value;
use indexmap::IndexMap;

use crate::types::{PinDirection, PinId, PinType};

static EMPTY: Value = Value::Empty;

#[derive(Clone, Debug)]
pub struct Pin {
    pub id: PinId,
    pub name: String,
    pub direction: PinDirection,
    ty: PinType,
    value: Value,
    /// Inferring pins take their type from connected peers instead of declaring one.
    inferred: bool,
    connections: usize,
}

impl Pin {
    pub fn ty(&self) -> &PinType {
        &self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_inferred(&self) -> bool {
        self.inferred
    }

    pub fn is_connected(&self) -> bool {
        self.connections > 0
    }

    pub fn connection_count(&self) -> usize {
        self.connections
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinEvent {
    Added(PinId),
    Removed(PinId),
    TypeChanged(PinId),
}

#[derive(Clone, Debug, Default)]
pub struct PinSet {
    pins: IndexMap<PinId, Pin>,
    next_id: u32,
    events: Vec<PinEvent>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, name: &str, direction: PinDirection, ty: PinType, inferred: bool) -> PinId {
        let id = PinId(self.next_id);
        self.next_id += 1;
        let pin = Pin {
            id,
            name: name.to_string(),
            direction,
            value: ty.default_value(),
            ty,
            inferred,
            connections: 0,
        };
        self.pins.insert(id, pin);
        self.events.push(PinEvent::Added(id));
        id
    }

    pub fn create_input(&mut self, name: &str, ty: PinType) -> PinId {
        self.create(name, PinDirection::Input, ty, false)
    }

    pub fn create_output(&mut self, name: &str, ty: PinType) -> PinId {
        self.create(name, PinDirection::Output, ty, false)
    }

    /// Input whose type is inferred from its connections; starts as [`PinType::Any`].
    pub fn create_inferred_input(&mut self, name: &str) -> PinId {
        self.create(name, PinDirection::Input, PinType::Any, true)
    }

    pub fn create_inferred_output(&mut self, name: &str) -> PinId {
        self.create(name, PinDirection::Output, PinType::Any, true)
    }

    /// Remove a pin. The owning script severs any connection it still had.
    pub fn remove(&mut self, id: PinId) -> Option<Pin> {
        let removed = self.pins.shift_remove(&id);
        if removed.is_some() {
            self.events.push(PinEvent::Removed(id));
        }
        removed
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    pub fn contains(&self, id: PinId) -> bool {
        self.pins.contains_key(&id)
    }

    /// Current value of a pin, or [`Value::Empty`] for unknown pins.
    pub fn value(&self, id: PinId) -> &Value {
        self.pins.get(&id).map(|p| &p.value).unwrap_or(&EMPTY)
    }

    /// Store a value; values the pin's type rejects are replaced by the type's default.
    pub fn set_value(&mut self, id: PinId, value: Value) {
        if let Some(pin) = self.pins.get_mut(&id) {
            pin.value = if pin.ty.accepts(&value) {
                value
            } else {
                pin.ty.default_value()
            };
        }
    }

    pub fn ty(&self, id: PinId) -> Option<&PinType> {
        self.pins.get(&id).map(|p| &p.ty)
    }

    /// Reassign a pin's type. Returns `true` if the type changed; the value is reset to the
    /// new type's default and a [`PinEvent::TypeChanged`] is recorded.
    pub fn set_type(&mut self, id: PinId, ty: PinType) -> bool {
        match self.pins.get_mut(&id) {
            Some(pin) if pin.ty != ty => {
                pin.value = ty.default_value();
                pin.ty = ty;
                self.events.push(PinEvent::TypeChanged(id));
                true
            }
            _ => false,
        }
    }

    pub fn find(&self, name: &str, direction: PinDirection) -> Option<PinId> {
        self.pins
            .values()
            .find(|p| p.direction == direction && p.name == name)
            .map(|p| p.id)
    }

    pub fn find_input(&self, name: &str) -> Option<PinId> {
        self.find(name, PinDirection::Input)
    }

    pub fn find_output(&self, name: &str) -> Option<PinId> {
        self.find(name, PinDirection::Output)
    }

    pub fn is_connected(&self, id: PinId) -> bool {
        self.pins.get(&id).is_some_and(Pin::is_connected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Pin> {
        self.iter().filter(|p| p.direction == PinDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Pin> {
        self.iter().filter(|p| p.direction == PinDirection::Output)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub(crate) fn add_connection(&mut self, id: PinId) {
        if let Some(pin) = self.pins.get_mut(&id) {
            pin.connections += 1;
        }
    }

    pub(crate) fn drop_connection(&mut self, id: PinId) {
        if let Some(pin) = self.pins.get_mut(&id) {
            pin.connections = pin.connections.saturating_sub(1);
        }
    }

    pub(crate) fn take_events(&mut self) -> Vec<PinEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn snapshot_outputs(&self) -> Vec<(PinId, Value)> {
        self.outputs().map(|p| (p.id, p.value.clone())).collect()
    }

    pub(crate) fn restore(&mut self, snapshot: Vec<(PinId, Value)>) {
        for (id, value) in snapshot {
            if let Some(pin) = self.pins.get_mut(&id) {
                pin.value = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_record_lifecycle_events() {
        let mut pins = PinSet::new();
        let a = pins.create_input("a", PinType::Numeric);
        let b = pins.create_inferred_output("b");
        assert!(pins.set_type(b, PinType::Color));
        assert!(!pins.set_type(b, PinType::Color));
        pins.remove(a);
        assert_eq!(
            pins.take_events(),
            vec![
                PinEvent::Added(a),
                PinEvent::Added(b),
                PinEvent::TypeChanged(b),
                PinEvent::Removed(a)
            ]
        );
        assert!(pins.take_events().is_empty());
    }

    #[test]
    fn it_should_reset_value_on_type_change() {
        let mut pins = PinSet::new();
        let p = pins.create_inferred_input("x");
        pins.set_type(p, PinType::Numeric);
        pins.set_value(p, Value::Numeric(3.0));
        assert_eq!(pins.value(p), &Value::Numeric(3.0));
        pins.set_type(p, PinType::Boolean);
        assert_eq!(pins.value(p), &Value::Bool(false));
    }

    #[test]
    fn it_should_reject_mistyped_values() {
        let mut pins = PinSet::new();
        let p = pins.create_input("n", PinType::Numeric);
        pins.set_value(p, Value::text("nope"));
        assert_eq!(pins.value(p), &Value::Numeric(0.0));
        assert_eq!(pins.value(PinId(99)), &Value::Empty);
    }

    #[test]
    fn it_should_never_reuse_ids() {
        let mut pins = PinSet::new();
        let a = pins.create_input("a", PinType::Any);
        pins.remove(a);
        let b = pins.create_input("a", PinType::Any);
        assert_ne!(a, b);
        assert_eq!(pins.find_input("a"), Some(b));
        assert_eq!(pins.find_output("a"), None);
    }
}
