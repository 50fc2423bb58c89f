//! Narrowing the registry to the tools offered with one request.
//!
//! ```rust
//! use tprotocol::ToolSchema;
//! use ttooling::{ToolReference, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! for name in ["a", "b", "c"] {
//!     registry.declare(ToolSchema::new(name, ""));
//! }
//!
//! let selected = registry.select(["a", "b"]).expect("both are registered");
//! assert_eq!(selected.names(), vec!["a".to_string(), "b".to_string()]);
//!
//! let error = registry.select([ToolReference::from("zzz")]).expect_err("unknown");
//! assert_eq!(error.message, "unknown tool requested: zzz");
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use tprotocol::ToolSchema;

use crate::{ToolEntry, ToolError, ToolRegistry};

/// How a request refers to a registered tool. Only the name is used for
/// lookup; schema contents are not compared against the registered schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolReference {
    Name(String),
    /// A schema as raw JSON; must carry a string `name`.
    RawSchema(Value),
    Schema(ToolSchema),
}

impl ToolReference {
    pub fn name(&self) -> Result<&str, ToolError> {
        match self {
            Self::Name(name) => Ok(name),
            Self::Schema(schema) => Ok(&schema.name),
            Self::RawSchema(value) => value
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::configuration("tool schema reference has no 'name'")),
        }
    }
}

impl From<&str> for ToolReference {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for ToolReference {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&String> for ToolReference {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

impl From<Value> for ToolReference {
    fn from(value: Value) -> Self {
        Self::RawSchema(value)
    }
}

impl From<ToolSchema> for ToolReference {
    fn from(value: ToolSchema) -> Self {
        Self::Schema(value)
    }
}

impl From<&ToolSchema> for ToolReference {
    fn from(value: &ToolSchema) -> Self {
        Self::Schema(value.clone())
    }
}

/// The working set of one request: a name-keyed subset of the registry.
#[derive(Debug, Clone, Default)]
pub struct RequestToolSet {
    entries: BTreeMap<String, ToolEntry>,
}

impl RequestToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ToolEntry) -> Option<ToolEntry> {
        self.entries.insert(entry.name().to_string(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ToolEntry> {
        self.entries.remove(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.entries
            .values()
            .map(|entry| entry.schema().clone())
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ToolEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ToolEntry> for RequestToolSet {
    fn from_iter<I: IntoIterator<Item = ToolEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl ToolRegistry {
    /// Builds the working set for `references`. Any unknown name fails the
    /// whole selection; repeated names collapse to one entry.
    pub fn select<I, R>(&self, references: I) -> Result<RequestToolSet, ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolReference>,
    {
        let mut selected = RequestToolSet::new();
        for reference in references {
            let reference = reference.into();
            let name = reference.name()?;
            let entry = self
                .get(name)
                .ok_or_else(|| ToolError::not_found(format!("unknown tool requested: {name}")))?;

            if let ToolReference::Schema(schema) = &reference
                && schema != entry.schema()
            {
                tracing::debug!(
                    phase = "tool",
                    event = "schema_mismatch",
                    tool_name = name,
                    "requested schema differs from the registered one; using the registered tool"
                );
            }

            selected.insert(entry.clone());
        }
        Ok(selected)
    }
}
