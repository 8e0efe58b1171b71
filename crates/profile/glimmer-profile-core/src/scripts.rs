use glimmer_api_core::coercion::to_bool;
use glimmer_api_core::{Value, ValueSource};
use glimmer_graph_core::{EvalContext, NodeScript, ScriptId};
use hashbrown::HashMap;
use indexmap::IndexMap;

/// Node scripts owned by a profile, together with their results from the last evaluation.
///
/// Conditions and bindings refer to scripts by id; the library evaluates each script once per
/// tick so every reader sees the same result.
#[derive(Default)]
pub struct ScriptLibrary {
    scripts: IndexMap<ScriptId, NodeScript>,
    results: HashMap<ScriptId, Value>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a script. A replaced script's stale result is dropped.
    pub fn insert(&mut self, script: NodeScript) -> Option<NodeScript> {
        let id = script.id();
        self.results.remove(&id);
        self.scripts.insert(id, script)
    }

    pub fn remove(&mut self, id: ScriptId) -> Option<NodeScript> {
        self.results.remove(&id);
        self.scripts.shift_remove(&id)
    }

    pub fn contains(&self, id: ScriptId) -> bool {
        self.scripts.contains_key(&id)
    }

    pub fn get(&self, id: ScriptId) -> Option<&NodeScript> {
        self.scripts.get(&id)
    }

    pub fn get_mut(&mut self, id: ScriptId) -> Option<&mut NodeScript> {
        self.scripts.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeScript> {
        self.scripts.values()
    }

    /// Evaluate every script against `data` and record the results. Returns the number of node
    /// faults raised; each fault is already logged by its script.
    pub fn evaluate(&mut self, data: &dyn ValueSource) -> usize {
        let ctx = EvalContext::new(data);
        let mut faults = 0;
        for (id, script) in self.scripts.iter_mut() {
            let report = script.evaluate(&ctx);
            faults += report.faults.len();
            self.results.insert(*id, script.result());
        }
        faults
    }

    pub fn results(&self) -> &HashMap<ScriptId, Value> {
        &self.results
    }

    pub fn result(&self, id: ScriptId) -> Option<&Value> {
        self.results.get(&id)
    }

    /// Whether a condition script currently holds; unevaluated scripts do not.
    pub fn condition(&self, id: ScriptId) -> bool {
        self.results.get(&id).map(to_bool).unwrap_or(false)
    }
}
