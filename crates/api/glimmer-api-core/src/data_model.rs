//! Host-fed data model that bindings, dynamic modifiers and data model nodes read from.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{DataPath, PathError, Value};

/// Anything that can answer "what is the value at this path right now".
pub trait ValueSource {
    fn value(&self, path: &DataPath) -> Option<Value>;
}

/// Single entry with provenance information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub value: Value,
    pub epoch: u64,
    pub source: String,
}

#[derive(Debug, Default, Clone)]
pub struct DataModel {
    inner: HashMap<DataPath, DataEntry>,
    epoch: u64,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the epoch stamped on subsequent writes. Hosts call this once per frame.
    pub fn advance_epoch(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Store a value, returning the entry it replaced.
    pub fn set(
        &mut self,
        path: DataPath,
        value: Value,
        source: impl Into<String>,
    ) -> Option<DataEntry> {
        let entry = DataEntry {
            value,
            epoch: self.epoch,
            source: source.into(),
        };
        self.inner.insert(path, entry)
    }

    /// Parse `path` and store a value under it.
    pub fn set_str(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        let path = DataPath::parse(path)?;
        self.set(path, value, "host");
        Ok(())
    }

    pub fn entry(&self, path: &DataPath) -> Option<&DataEntry> {
        self.inner.get(path)
    }

    pub fn get(&self, path: &DataPath) -> Option<&Value> {
        self.inner.get(path).map(|e| &e.value)
    }

    /// Get a value by path string. Returns None if absent or the path does not parse.
    pub fn get_str(&self, path: &str) -> Option<&Value> {
        DataPath::parse(path).ok().and_then(|p| self.get(&p))
    }

    pub fn remove(&mut self, path: &DataPath) -> Option<DataEntry> {
        self.inner.remove(path)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DataPath, &DataEntry)> {
        self.inner.iter()
    }
}

impl ValueSource for DataModel {
    fn value(&self, path: &DataPath) -> Option<Value> {
        self.get(path).cloned()
    }
}

impl<S: ValueSource + ?Sized> ValueSource for &S {
    fn value(&self, path: &DataPath) -> Option<Value> {
        (**self).value(path)
    }
}

/// An empty source; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoData;

impl ValueSource for NoData {
    fn value(&self, _path: &DataPath) -> Option<Value> {
        None
    }
}
