//! Node scripts: an acyclic set of nodes, their connections and a cached evaluation plan.
//!
//! Structural edits (`add_*`, `remove_node`, `connect`, `disconnect`) keep three things true:
//! the connection graph is acyclic, every connection joins compatible pin types, and the
//! inferring pins carry the types their connections dictate. Any edit drops the cached plan,
//! which is rebuilt in topological order on the next [`NodeScript::evaluate`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use glimmer_api_core::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{ConnectionData, NodeData, NodeScriptData};
use crate::error::GraphError;
use crate::infer::infer_types;
use crate::node::{EvalContext, Node};
use crate::nodes::ExitNode;
use crate::pin::{Pin, PinEvent, PinSet};
use crate::registry::NodeRegistry;
use crate::topo;
use crate::types::{NodeId, PinDirection, PinId, PinRef, PinType, ScriptId};

const MAX_RESOLVE_ROUNDS: usize = 32;

/// A node together with the pins it owns.
pub struct NodeSlot {
    id: NodeId,
    pins: PinSet,
    node: Box<dyn Node>,
}

impl NodeSlot {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn node(&self) -> &dyn Node {
        self.node.as_ref()
    }
}

impl std::fmt::Debug for NodeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSlot")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("pins", &self.pins.len())
            .finish()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: PinRef,
    pub to: PinRef,
}

/// A node that failed during evaluation; its outputs kept their previous values.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFault {
    pub node: NodeId,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalReport {
    pub evaluated: usize,
    pub faults: Vec<NodeFault>,
}

impl EvalReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Step {
    node: NodeId,
    feeds: Vec<(PinRef, PinId)>,
}

#[derive(Debug)]
pub struct NodeScript {
    id: ScriptId,
    name: String,
    result_type: PinType,
    exit_input: PinId,
    nodes: IndexMap<NodeId, NodeSlot>,
    /// input pin -> output pin feeding it
    connections: IndexMap<PinRef, PinRef>,
    next_node: u32,
    plan: Option<Vec<Step>>,
}

impl NodeScript {
    pub fn new(name: impl Into<String>, result_type: PinType) -> Self {
        let mut pins = PinSet::new();
        let exit = ExitNode::new(&mut pins, result_type.clone());
        pins.take_events();
        let exit_input = exit.input();
        let mut nodes = IndexMap::new();
        nodes.insert(
            NodeId::EXIT,
            NodeSlot {
                id: NodeId::EXIT,
                pins,
                node: Box::new(exit),
            },
        );
        Self {
            id: ScriptId::new(),
            name: name.into(),
            result_type,
            exit_input,
            nodes,
            connections: IndexMap::new(),
            next_node: 1,
            plan: None,
        }
    }

    pub fn id(&self) -> ScriptId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn result_type(&self) -> &PinType {
        &self.result_type
    }

    /// The exit node's input pin.
    pub fn exit_pin(&self) -> PinRef {
        PinRef::new(NodeId::EXIT, self.exit_input)
    }

    /// Value held by the exit node after the last evaluation.
    pub fn result(&self) -> Value {
        self.nodes
            .get(&NodeId::EXIT)
            .map(|slot| slot.pins.value(self.exit_input).clone())
            .unwrap_or_default()
    }

    // --- nodes -----------------------------------------------------------

    /// Add a node built against a fresh pin set.
    pub fn add<N, F>(&mut self, build: F) -> NodeId
    where
        N: Node + 'static,
        F: FnOnce(&mut PinSet) -> N,
    {
        let mut pins = PinSet::new();
        let node = build(&mut pins);
        self.add_boxed(Box::new(node), pins)
    }

    pub fn add_boxed(&mut self, node: Box<dyn Node>, pins: PinSet) -> NodeId {
        let id = NodeId(self.next_node);
        self.place(id, node, pins);
        id
    }

    /// Create a node of a registered kind.
    pub fn add_kind(
        &mut self,
        registry: &NodeRegistry,
        kind: &str,
        params: &serde_json::Value,
    ) -> Result<NodeId, GraphError> {
        let (node, pins) = registry.create(kind, params)?;
        Ok(self.add_boxed(node, pins))
    }

    /// Insert a node under a caller-chosen id (used when loading).
    pub fn insert_node(
        &mut self,
        id: NodeId,
        node: Box<dyn Node>,
        pins: PinSet,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.place(id, node, pins);
        Ok(())
    }

    fn place(&mut self, id: NodeId, node: Box<dyn Node>, mut pins: PinSet) {
        pins.take_events();
        self.next_node = self.next_node.max(id.0 + 1);
        self.nodes.insert(id, NodeSlot { id, pins, node });
        self.plan = None;
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if id == NodeId::EXIT {
            return Err(GraphError::ExitNode);
        }
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode(id));
        }
        let touching: Vec<Connection> = self
            .connections()
            .filter(|c| c.from.node == id || c.to.node == id)
            .collect();
        for c in touching {
            self.sever(c);
        }
        self.nodes.shift_remove(&id);
        self.plan = None;
        self.resolve_types();
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSlot> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeSlot> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // --- pins ------------------------------------------------------------

    pub fn pin(&self, r: PinRef) -> Result<&Pin, GraphError> {
        self.nodes
            .get(&r.node)
            .ok_or(GraphError::UnknownNode(r.node))?
            .pins
            .get(r.pin)
            .ok_or(GraphError::UnknownPin(r))
    }

    fn find_pin(
        &self,
        node: NodeId,
        name: &str,
        direction: PinDirection,
    ) -> Result<PinRef, GraphError> {
        let slot = self.nodes.get(&node).ok_or(GraphError::UnknownNode(node))?;
        slot.pins
            .find(name, direction)
            .map(|pin| PinRef::new(node, pin))
            .ok_or_else(|| GraphError::UnknownPinName {
                node,
                name: name.to_string(),
                direction: match direction {
                    PinDirection::Input => "input",
                    PinDirection::Output => "output",
                },
            })
    }

    /// Look up an input pin by name.
    pub fn input(&self, node: NodeId, name: &str) -> Result<PinRef, GraphError> {
        self.find_pin(node, name, PinDirection::Input)
    }

    /// Look up an output pin by name.
    pub fn output(&self, node: NodeId, name: &str) -> Result<PinRef, GraphError> {
        self.find_pin(node, name, PinDirection::Output)
    }

    /// Set the value of an input pin. Connected inputs are overwritten on the next evaluation.
    pub fn set_input_value(&mut self, pin: PinRef, value: Value) -> Result<(), GraphError> {
        if self.pin(pin)?.direction != PinDirection::Input {
            return Err(GraphError::Direction);
        }
        if let Some(slot) = self.nodes.get_mut(&pin.node) {
            slot.pins.set_value(pin.pin, value);
        }
        Ok(())
    }

    // --- connections -----------------------------------------------------

    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.connections
            .iter()
            .map(|(to, from)| Connection { from: *from, to: *to })
    }

    /// Source feeding an input pin, if connected.
    pub fn source_of(&self, input: PinRef) -> Option<PinRef> {
        self.connections.get(&input).copied()
    }

    fn node_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.connections
            .iter()
            .map(|(to, from)| (from.node, to.node))
            .collect()
    }

    /// Connect an output pin to an input pin.
    ///
    /// Fails, leaving the script untouched, when the pins are of the wrong direction, their
    /// types are incompatible, or the edge would close a cycle. An input that is already
    /// connected is disconnected from its previous source first.
    pub fn connect(&mut self, from: PinRef, to: PinRef) -> Result<(), GraphError> {
        let from_pin = self.pin(from)?;
        let to_pin = self.pin(to)?;
        if from_pin.direction != PinDirection::Output || to_pin.direction != PinDirection::Input {
            return Err(GraphError::Direction);
        }
        if !from_pin.ty().is_compatible(to_pin.ty()) {
            return Err(GraphError::IncompatibleTypes {
                from,
                to,
                from_type: from_pin.ty().clone(),
                to_type: to_pin.ty().clone(),
            });
        }
        let from_type = from_pin.ty().clone();
        let to_type = to_pin.ty().clone();

        if topo::reaches(to.node, from.node, &self.node_edges()) {
            return Err(GraphError::Cycle { from, to });
        }

        if let Some(previous) = self.connections.get(&to).copied() {
            if previous == from {
                return Ok(());
            }
            self.sever(Connection { from: previous, to });
        }

        self.connections.insert(to, from);
        if let Some(slot) = self.nodes.get_mut(&to.node) {
            slot.pins.add_connection(to.pin);
            slot.node.on_connected(to.pin, &from_type, &mut slot.pins);
        }
        if let Some(slot) = self.nodes.get_mut(&from.node) {
            slot.pins.add_connection(from.pin);
            slot.node.on_connected(from.pin, &to_type, &mut slot.pins);
        }
        log::debug!("script '{}': connected {from} -> {to}", self.name);
        self.plan = None;
        self.resolve_types();
        Ok(())
    }

    /// Remove the connection feeding `to`, if any.
    pub fn disconnect(&mut self, to: PinRef) -> Option<Connection> {
        let from = self.connections.get(&to).copied()?;
        let connection = Connection { from, to };
        self.sever(connection);
        self.resolve_types();
        Some(connection)
    }

    /// Remove every connection touching `pin`. Returns how many were removed.
    pub fn disconnect_pin(&mut self, pin: PinRef) -> usize {
        let touching: Vec<Connection> = self
            .connections()
            .filter(|c| c.from == pin || c.to == pin)
            .collect();
        let count = touching.len();
        for c in touching {
            self.sever(c);
        }
        if count > 0 {
            self.resolve_types();
        }
        count
    }

    /// Drop a connection and notify both ends. Does not re-run inference.
    fn sever(&mut self, c: Connection) {
        if self.connections.shift_remove(&c.to).is_none() {
            return;
        }
        if let Some(slot) = self.nodes.get_mut(&c.to.node) {
            slot.pins.drop_connection(c.to.pin);
            slot.node.on_disconnected(c.to.pin, &mut slot.pins);
        }
        if let Some(slot) = self.nodes.get_mut(&c.from.node) {
            slot.pins.drop_connection(c.from.pin);
            slot.node.on_disconnected(c.from.pin, &mut slot.pins);
        }
        self.plan = None;
    }

    // --- type propagation ------------------------------------------------

    /// Re-derive inferred pin types until nothing changes: apply pending pin events, assign
    /// inferred types, tell peers about retyped pins and sever connections that no longer
    /// type-check.
    fn resolve_types(&mut self) {
        for _ in 0..MAX_RESOLVE_ROUNDS {
            let mut changed = self.apply_pin_events();

            let mut retyped = Vec::new();
            for (pin, ty) in infer_types(&self.nodes, &self.connections) {
                if let Some(slot) = self.nodes.get_mut(&pin.node) {
                    if slot.pins.set_type(pin.pin, ty.clone()) {
                        retyped.push((pin, ty));
                    }
                }
            }
            for (pin, ty) in &retyped {
                self.notify_peers(*pin, ty);
            }
            changed |= !retyped.is_empty();
            changed |= self.sever_incompatible();

            if !changed {
                return;
            }
            self.plan = None;
        }
        log::warn!(
            "script '{}': pin types did not settle after {MAX_RESOLVE_ROUNDS} rounds",
            self.name
        );
    }

    fn apply_pin_events(&mut self) -> bool {
        let mut changed = false;
        let mut removed = Vec::new();
        for slot in self.nodes.values_mut() {
            for event in slot.pins.take_events() {
                changed = true;
                if let PinEvent::Removed(pin) = event {
                    removed.push(PinRef::new(slot.id, pin));
                }
            }
        }
        for pin in removed {
            let touching: Vec<Connection> = self
                .connections()
                .filter(|c| c.from == pin || c.to == pin)
                .collect();
            for c in touching {
                self.sever(c);
            }
        }
        changed
    }

    fn notify_peers(&mut self, pin: PinRef, ty: &PinType) {
        let peers: Vec<PinRef> = self
            .connections()
            .filter_map(|c| {
                if c.from == pin {
                    Some(c.to)
                } else if c.to == pin {
                    Some(c.from)
                } else {
                    None
                }
            })
            .collect();
        for peer in peers {
            if let Some(slot) = self.nodes.get_mut(&peer.node) {
                slot.node.on_peer_type_changed(peer.pin, ty, &mut slot.pins);
            }
        }
    }

    fn sever_incompatible(&mut self) -> bool {
        let broken: Vec<Connection> = self
            .connections()
            .filter(|c| match (self.pin(c.from), self.pin(c.to)) {
                (Ok(a), Ok(b)) => !a.ty().is_compatible(b.ty()),
                _ => true,
            })
            .collect();
        for c in &broken {
            log::debug!(
                "script '{}': severing {} -> {} after a type change",
                self.name,
                c.from,
                c.to
            );
            self.sever(*c);
        }
        !broken.is_empty()
    }

    // --- evaluation ------------------------------------------------------

    fn build_plan(&self) -> Vec<Step> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let order = topo::topo_order(&ids, &self.node_edges()).unwrap_or_else(|| {
            log::error!("script '{}': connection graph is cyclic", self.name);
            ids.clone()
        });
        order
            .into_iter()
            .map(|node| Step {
                node,
                feeds: self
                    .connections
                    .iter()
                    .filter(|(to, _)| to.node == node)
                    .map(|(to, from)| (*from, to.pin))
                    .collect(),
            })
            .collect()
    }

    /// Current evaluation order.
    pub fn order(&mut self) -> Vec<NodeId> {
        let plan = self.plan.take().unwrap_or_else(|| self.build_plan());
        let order = plan.iter().map(|s| s.node).collect();
        self.plan = Some(plan);
        order
    }

    /// Evaluate every node once in dependency order.
    ///
    /// A node that returns an error or panics has its outputs restored to their values from
    /// before the call; the fault is logged and reported, and evaluation carries on.
    pub fn evaluate(&mut self, ctx: &EvalContext<'_>) -> EvalReport {
        let plan = self.plan.take().unwrap_or_else(|| self.build_plan());
        let mut report = EvalReport::default();

        for step in &plan {
            for (from, to_pin) in &step.feeds {
                let value = self
                    .nodes
                    .get(&from.node)
                    .map(|slot| slot.pins.value(from.pin).clone())
                    .unwrap_or_default();
                if let Some(slot) = self.nodes.get_mut(&step.node) {
                    slot.pins.set_value(*to_pin, value);
                }
            }

            let Some(slot) = self.nodes.get_mut(&step.node) else {
                continue;
            };
            let snapshot = slot.pins.snapshot_outputs();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                slot.node.evaluate(&mut slot.pins, ctx)
            }));
            report.evaluated += 1;
            // evaluation may not restructure pins
            slot.pins.take_events();

            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => panic_message(payload),
            };
            slot.pins.restore(snapshot);
            log::warn!(
                "script '{}': node {} ({}) failed: {message}",
                self.name,
                slot.id,
                slot.kind()
            );
            report.faults.push(NodeFault {
                node: slot.id,
                kind: slot.kind(),
                message,
            });
        }

        self.plan = Some(plan);
        report
    }

    // --- persistence -----------------------------------------------------

    /// Build a script from its serialized form.
    pub fn load(data: &NodeScriptData, registry: &NodeRegistry) -> Result<Self, GraphError> {
        let mut script = NodeScript::new(data.name.clone(), data.result_type.clone());
        if let Some(id) = data.id {
            script.id = id;
        }
        for n in &data.nodes {
            let (node, pins) = registry.create(&n.kind, &n.params)?;
            script.insert_node(n.id, node, pins)?;
        }
        for c in &data.connections {
            let from = script.output(c.from_node, &c.from_pin)?;
            let to = script.input(c.to_node, &c.to_pin)?;
            script.connect(from, to)?;
        }
        Ok(script)
    }

    pub fn save(&self) -> NodeScriptData {
        let pin_name = |r: &PinRef| {
            self.pin(*r)
                .map(|p| p.name.clone())
                .unwrap_or_default()
        };
        NodeScriptData {
            id: Some(self.id),
            name: self.name.clone(),
            result_type: self.result_type.clone(),
            nodes: self
                .nodes
                .values()
                .filter(|slot| slot.id != NodeId::EXIT)
                .map(|slot| NodeData {
                    id: slot.id,
                    kind: slot.kind().to_string(),
                    params: slot.node.params(),
                })
                .collect(),
            connections: self
                .connections()
                .map(|c| ConnectionData {
                    from_node: c.from.node,
                    from_pin: pin_name(&c.from),
                    to_node: c.to.node,
                    to_pin: pin_name(&c.to),
                })
                .collect(),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
