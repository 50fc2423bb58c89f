//! Tool registry keyed by schema name.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::ToolSchema;
//! use ttooling::ToolRegistry;
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_sync_fn(ToolSchema::new("echo", "Echoes"), |args| Ok(args.to_value()))
//!     .expect("schema is supplied");
//! registry.declare(ToolSchema::new("remote", "Handled elsewhere"));
//!
//! assert_eq!(registry.toolset(), vec!["echo".to_string(), "remote".to_string()]);
//! assert!(registry.get("remote").expect("declared").implementation().is_none());
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;
use tcommon::Registry;
use tprotocol::ToolSchema;

use crate::{
    FunctionTool, RequestToolSet, Tool, ToolArguments, ToolError, ToolLoader, ToolReference,
    ToolRegistration, resolve_tool, resolver::warn_declared,
};

#[derive(Clone)]
pub enum ToolImplementation {
    Available(Arc<dyn Tool>),
    /// Registered from a schema alone.
    Declared,
}

/// A registered tool. The schema is always present; a declared entry offers
/// nothing to invoke.
#[derive(Clone)]
pub struct ToolEntry {
    implementation: ToolImplementation,
    schema: ToolSchema,
}

impl ToolEntry {
    pub fn new(implementation: ToolImplementation, schema: ToolSchema) -> Self {
        Self {
            implementation,
            schema,
        }
    }

    pub fn available(tool: Arc<dyn Tool>, schema: ToolSchema) -> Self {
        Self::new(ToolImplementation::Available(tool), schema)
    }

    pub fn declared(schema: ToolSchema) -> Self {
        Self::new(ToolImplementation::Declared, schema)
    }

    pub fn implementation(&self) -> Option<&Arc<dyn Tool>> {
        match &self.implementation {
            ToolImplementation::Available(tool) => Some(tool),
            ToolImplementation::Declared => None,
        }
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

impl Debug for ToolEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.schema.name)
            .field("available", &self.implementation().is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Registry<String, ToolEntry>,
    loader: Option<Arc<dyn ToolLoader>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose path registrations resolve through `loader`.
    pub fn with_loader(loader: Arc<dyn ToolLoader>) -> Self {
        Self {
            tools: Registry::new(),
            loader: Some(loader),
        }
    }

    pub fn set_loader(&mut self, loader: Arc<dyn ToolLoader>) {
        self.loader = Some(loader);
    }

    pub fn loader(&self) -> Option<&Arc<dyn ToolLoader>> {
        self.loader.as_ref()
    }

    /// Resolves and stores one tool, replacing any entry with the same name.
    pub fn register(&mut self, registration: impl Into<ToolRegistration>) -> Result<(), ToolError> {
        let entry = resolve_tool(registration.into(), self.loader.as_deref())?;
        self.insert(entry);
        Ok(())
    }

    /// Registers each element in turn. Stops at the first failure; entries
    /// registered before it are kept.
    pub fn register_many<I, R>(&mut self, registrations: I) -> Result<(), ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolRegistration>,
    {
        for registration in registrations {
            self.register(registration)?;
        }
        Ok(())
    }

    pub fn register_tool<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register(ToolRegistration::function(tool))
    }

    pub fn register_fn<F, Fut>(&mut self, schema: ToolSchema, handler: F) -> Result<(), ToolError>
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register_tool(FunctionTool::new(handler).with_schema(schema))
    }

    pub fn register_sync_fn<F>(&mut self, schema: ToolSchema, handler: F) -> Result<(), ToolError>
    where
        F: Fn(ToolArguments) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_tool(FunctionTool::sync(handler).with_schema(schema))
    }

    /// Registers a schema with no implementation. Calls to it are skipped.
    pub fn declare(&mut self, schema: ToolSchema) {
        warn_declared(&schema.name);
        self.insert(ToolEntry::declared(schema));
    }

    pub fn insert(&mut self, entry: ToolEntry) -> Option<ToolEntry> {
        self.tools.insert(entry.name().to_string(), entry)
    }

    /// Registered names, sorted.
    pub fn toolset(&self) -> Vec<String> {
        let mut names = self.tools.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ToolEntry> {
        self.tools.remove(name)
    }

    pub fn clear(&mut self) {
        self.tools.clear();
    }

    /// Schemas of every entry, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas = self
            .tools
            .values()
            .map(|entry| entry.schema().clone())
            .collect::<Vec<_>>();
        schemas.sort_by(|left, right| left.name.cmp(&right.name));
        schemas
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.toolset())
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

/// Copy-on-write registry handle shared between a client and its requests.
///
/// Readers work on a snapshot; `register` and `clear` publish a new registry,
/// so they never race an in-flight selection or dispatch.
#[derive(Clone, Default)]
pub struct SharedToolRegistry {
    inner: Arc<ArcSwap<ToolRegistry>>,
}

impl SharedToolRegistry {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<ToolRegistry> {
        self.inner.load_full()
    }

    pub fn register(&self, registration: impl Into<ToolRegistration>) -> Result<(), ToolError> {
        let loader = self.inner.load().loader().cloned();
        let entry = resolve_tool(registration.into(), loader.as_deref())?;
        self.publish(|registry| {
            registry.insert(entry.clone());
        });
        Ok(())
    }

    pub fn register_many<I, R>(&self, registrations: I) -> Result<(), ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolRegistration>,
    {
        for registration in registrations {
            self.register(registration)?;
        }
        Ok(())
    }

    pub fn declare(&self, schema: ToolSchema) {
        warn_declared(&schema.name);
        let entry = ToolEntry::declared(schema);
        self.publish(|registry| {
            registry.insert(entry.clone());
        });
    }

    pub fn clear(&self) {
        self.publish(ToolRegistry::clear);
    }

    pub fn toolset(&self) -> Vec<String> {
        self.inner.load().toolset()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    pub fn select<I, R>(&self, references: I) -> Result<RequestToolSet, ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolReference>,
    {
        self.inner.load().select(references)
    }

    fn publish<F>(&self, update: F)
    where
        F: Fn(&mut ToolRegistry),
    {
        self.inner.rcu(|current| {
            let mut next = ToolRegistry::clone(current);
            update(&mut next);
            next
        });
    }
}

impl From<ToolRegistry> for SharedToolRegistry {
    fn from(value: ToolRegistry) -> Self {
        Self::new(value)
    }
}

impl Debug for SharedToolRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedToolRegistry")
            .field(&*self.inner.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ToolErrorKind, ToolSpec};

    fn schema(name: &str) -> ToolSchema {
        ToolSchema::new(name, format!("{name} tool"))
    }

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry
            .register_sync_fn(schema("echo"), |args| Ok(args.to_value()))
            .expect("echo should register");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("echo"));
        assert_eq!(registry.schemas().len(), 1);

        let removed = registry.remove("echo");
        assert!(removed.is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn re_registering_a_name_replaces_the_entry() {
        let mut registry = ToolRegistry::new();
        registry
            .register_sync_fn(schema("f"), |_| Ok(json!(1)))
            .expect("first");
        let first = Arc::clone(registry.get("f").and_then(ToolEntry::implementation).expect("impl"));

        registry
            .register_sync_fn(schema("f"), |_| Ok(json!(2)))
            .expect("second");
        let second = registry.get("f").and_then(ToolEntry::implementation).expect("impl");

        assert_eq!(registry.len(), 1);
        assert!(!Arc::ptr_eq(&first, second));
    }

    #[test]
    fn register_many_stops_at_first_failure_without_rollback() {
        let mut registry = ToolRegistry::new();
        let error = registry
            .register_many(vec![
                ToolRegistration::declared(schema("a")),
                ToolRegistration::function(FunctionTool::sync(|_| Ok(json!(null)))),
                ToolRegistration::declared(schema("c")),
            ])
            .expect_err("second entry has no schema");

        assert_eq!(error.kind, ToolErrorKind::Configuration);
        assert_eq!(registry.toolset(), vec!["a".to_string()]);
    }

    #[test]
    fn toolset_is_sorted_and_clear_empties() {
        let mut registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .register((ToolSpec::Declared, schema(name)))
                .expect("declared should register");
        }
        assert_eq!(registry.toolset(), vec!["a", "b", "c"]);

        registry.clear();
        assert!(registry.toolset().is_empty());
    }

    #[test]
    fn shared_registry_publishes_copies() {
        let shared = SharedToolRegistry::default();
        shared.declare(schema("a"));
        let before = shared.snapshot();

        shared
            .register(ToolRegistration::declared(schema("b")))
            .expect("should register");
        assert_eq!(before.toolset(), vec!["a".to_string()]);
        assert_eq!(shared.toolset(), vec!["a".to_string(), "b".to_string()]);

        shared.clear();
        assert!(shared.is_empty());
        assert_eq!(before.len(), 1);
    }
}
