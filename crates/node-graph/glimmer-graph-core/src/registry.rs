//! Node kind registry used when scripts are loaded from their serialized form.

use std::fmt;

use indexmap::IndexMap;

use crate::error::GraphError;
use crate::node::{Node, NodeError};
use crate::pin::PinSet;

pub type NodeFactory = Box<
    dyn Fn(&mut PinSet, &serde_json::Value) -> Result<Box<dyn Node>, NodeError> + Send + Sync,
>;

#[derive(Default)]
pub struct NodeRegistry {
    factories: IndexMap<String, NodeFactory>,
}

impl NodeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in node kind.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        crate::nodes::register_builtins(&mut reg);
        reg
    }

    /// Register (or replace) a node kind.
    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&mut PinSet, &serde_json::Value) -> Result<Box<dyn Node>, NodeError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.to_string(), Box::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate a node together with its freshly created pins.
    pub fn create(
        &self,
        kind: &str,
        params: &serde_json::Value,
    ) -> Result<(Box<dyn Node>, PinSet), GraphError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| GraphError::UnknownKind(kind.to_string()))?;
        let mut pins = PinSet::new();
        let node = factory(&mut pins, params).map_err(|source| GraphError::Create {
            kind: kind.to_string(),
            source,
        })?;
        Ok((node, pins))
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
