//! DataPath parsing and formatting.
//!
//! Grammar:
//!   namespace/.../target.field.subfield
//! - '/' separates namespace segments
//! - The last '/'-separated segment contains the `target` and optional `.`-separated fields
//!   Examples:
//!   "plugins/cpu/Usage.total" -> namespaces=["plugins","cpu"], target="Usage", fields=["total"]
//!   "game/health" -> namespaces=["game"], target="health", fields=[]
//!
//! Paths address entries of a [`DataModel`](crate::DataModel) and are also what data bindings
//! and dynamic modifier parameters point at.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("invalid data path '{path}': {reason}")]
    Invalid { path: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataPath {
    /// Namespace segments preceding the target (may be empty)
    pub namespaces: Vec<String>,
    /// Target name (last segment before field selectors)
    pub target: String,
    /// Ordered field selectors on the target (may be empty)
    pub fields: Vec<String>,
}

impl DataPath {
    pub fn new(namespaces: Vec<String>, target: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            namespaces,
            target: target.into(),
            fields,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let invalid = |reason| PathError::Invalid {
            path: s.to_string(),
            reason,
        };

        let mut parts: Vec<&str> = s.split('/').collect();
        if parts.iter().any(|seg| seg.is_empty()) {
            return Err(invalid("empty namespace segment"));
        }
        let last = match parts.pop() {
            Some(last) => last,
            None => return Err(PathError::Empty),
        };
        let mut last_parts = last.split('.');
        let target = last_parts.next().unwrap_or_default();
        if target.is_empty() {
            return Err(invalid("empty target name"));
        }
        if target.chars().any(char::is_whitespace) {
            return Err(invalid("target contains whitespace"));
        }
        let fields: Vec<String> = last_parts.map(str::to_string).collect();

        if parts.iter().any(|seg| seg.chars().any(char::is_whitespace)) {
            return Err(invalid("namespace contains whitespace"));
        }
        if fields.iter().any(|seg| seg.is_empty()) {
            return Err(invalid("empty field segment"));
        }
        if fields
            .iter()
            .any(|seg| seg.chars().any(char::is_whitespace))
        {
            return Err(invalid("field contains whitespace"));
        }

        Ok(DataPath {
            namespaces: parts.into_iter().map(str::to_string).collect(),
            target: target.to_string(),
            fields,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|s| s.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|s| s.as_str())
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            write!(f, "{ns}/")?;
        }
        f.write_str(&self.target)?;
        for field in &self.fields {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

impl FromStr for DataPath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataPath::parse(s)
    }
}

// Serialized as its string form.
impl Serialize for DataPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataPath {
    fn deserialize<D>(deserializer: D) -> Result<DataPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DataPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let p = DataPath::parse("plugins/cpu/Usage.total").unwrap();
        assert_eq!(p.namespaces, vec!["plugins".to_string(), "cpu".to_string()]);
        assert_eq!(p.target, "Usage");
        assert_eq!(p.fields, vec!["total".to_string()]);
        assert_eq!(p.to_string(), "plugins/cpu/Usage.total");
    }

    #[test]
    fn parse_only_target() {
        let p = DataPath::parse("volume").unwrap();
        assert!(p.namespaces.is_empty());
        assert_eq!(p.target, "volume");
        assert_eq!(p.to_string(), "volume");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(DataPath::parse(""), Err(PathError::Empty));
        assert!(DataPath::parse("game//health").is_err());
        assert!(DataPath::parse("game/").is_err());
        assert!(DataPath::parse("game/.x").is_err());
        assert!(DataPath::parse("game/health.").is_err());
        assert!(DataPath::parse("game/player health").is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let p = DataPath::parse("audio/Level.left").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"audio/Level.left\"");
        let back: DataPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
