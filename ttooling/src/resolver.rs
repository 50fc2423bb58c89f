//! Normalizes tool registrations into registry entries.
//!
//! Path references never trigger arbitrary loading: modules are obtained from a
//! caller-supplied [`ToolLoader`], which is the only trust boundary between a
//! configuration string and executable code.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tprotocol::ToolSchema;
//! use ttooling::{FunctionTool, ToolNamespace, ToolRegistration, resolve_tool};
//!
//! let mut namespace = ToolNamespace::new();
//! namespace
//!     .insert_tool(
//!         "pkg.math.add",
//!         FunctionTool::sync(|_| Ok(json!(3))).with_schema(ToolSchema::new("add", "Adds")),
//!     )
//!     .expect("path should be free");
//!
//! let entry = resolve_tool(ToolRegistration::from("pkg.math.add"), Some(&namespace))
//!     .expect("path should resolve");
//! assert_eq!(entry.name(), "add");
//! assert!(entry.implementation().is_some());
//!
//! let same = resolve_tool(ToolRegistration::from("pkg|math.add"), Some(&namespace))
//!     .expect("explicit split should resolve");
//! assert_eq!(same.name(), "add");
//! ```

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use serde_json::Value;
use tprotocol::ToolSchema;

use crate::{Tool, ToolEntry, ToolError};

/// Accepted shapes of a tool reference.
#[derive(Clone)]
pub enum ToolSpec {
    /// `module.path.callable` or `module|attribute.path`.
    Path(String),
    Function(Arc<dyn Tool>),
    /// Schema only; calls to it are skipped.
    Declared,
}

impl ToolSpec {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn function<T>(tool: T) -> Self
    where
        T: Tool + 'static,
    {
        Self::Function(Arc::new(tool))
    }
}

impl Debug for ToolSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Declared => f.write_str("Declared"),
        }
    }
}

impl From<&str> for ToolSpec {
    fn from(value: &str) -> Self {
        Self::Path(value.to_string())
    }
}

impl From<String> for ToolSpec {
    fn from(value: String) -> Self {
        Self::Path(value)
    }
}

impl From<Arc<dyn Tool>> for ToolSpec {
    fn from(value: Arc<dyn Tool>) -> Self {
        Self::Function(value)
    }
}

/// A spec plus the optional explicit schema that overrides any attached one.
#[derive(Debug, Clone)]
pub struct ToolRegistration {
    pub spec: ToolSpec,
    pub schema: Option<ToolSchema>,
}

impl ToolRegistration {
    pub fn new(spec: impl Into<ToolSpec>) -> Self {
        Self {
            spec: spec.into(),
            schema: None,
        }
    }

    pub fn function<T>(tool: T) -> Self
    where
        T: Tool + 'static,
    {
        Self::new(ToolSpec::function(tool))
    }

    pub fn declared(schema: ToolSchema) -> Self {
        Self {
            spec: ToolSpec::Declared,
            schema: Some(schema),
        }
    }

    pub fn with_schema(mut self, schema: ToolSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

impl From<ToolSpec> for ToolRegistration {
    fn from(value: ToolSpec) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ToolRegistration {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ToolRegistration {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Arc<dyn Tool>> for ToolRegistration {
    fn from(value: Arc<dyn Tool>) -> Self {
        Self::new(value)
    }
}

impl From<(ToolSpec, ToolSchema)> for ToolRegistration {
    fn from((spec, schema): (ToolSpec, ToolSchema)) -> Self {
        Self::new(spec).with_schema(schema)
    }
}

impl From<(&str, ToolSchema)> for ToolRegistration {
    fn from((spec, schema): (&str, ToolSchema)) -> Self {
        Self::new(spec).with_schema(schema)
    }
}

impl From<(String, ToolSchema)> for ToolRegistration {
    fn from((spec, schema): (String, ToolSchema)) -> Self {
        Self::new(spec).with_schema(schema)
    }
}

impl From<(Arc<dyn Tool>, ToolSchema)> for ToolRegistration {
    fn from((spec, schema): (Arc<dyn Tool>, ToolSchema)) -> Self {
        Self::new(spec).with_schema(schema)
    }
}

impl From<(Option<Arc<dyn Tool>>, ToolSchema)> for ToolRegistration {
    fn from((tool, schema): (Option<Arc<dyn Tool>>, ToolSchema)) -> Self {
        match tool {
            Some(tool) => Self::new(tool).with_schema(schema),
            None => Self::declared(schema),
        }
    }
}

/// A parsed path reference: a loadable module plus the attributes to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPath {
    pub module: String,
    pub attributes: Vec<String>,
}

impl ToolPath {
    pub fn parse(path: &str) -> Result<Self, ToolError> {
        let (module, attributes) = match path.split_once('|') {
            Some((_, attributes)) if attributes.contains('|') => {
                return Err(ToolError::resolution(format!(
                    "tool path '{path}' has more than one '|'"
                )));
            }
            Some((module, attributes)) => (module, attributes.split('.').collect::<Vec<_>>()),
            None => {
                let (module, attribute) = path.rsplit_once('.').ok_or_else(|| {
                    ToolError::resolution(format!("tool path '{path}' names no module"))
                })?;
                (module, vec![attribute])
            }
        };

        if module.split('.').any(str::is_empty)
            || attributes.iter().any(|segment| segment.is_empty())
        {
            return Err(ToolError::resolution(format!(
                "tool path '{path}' has an empty segment"
            )));
        }

        Ok(Self {
            module: module.to_string(),
            attributes: attributes.into_iter().map(ToString::to_string).collect(),
        })
    }
}

impl Display for ToolPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.module, self.attributes.join("."))
    }
}

#[derive(Clone)]
pub enum ModuleItem {
    Tool(Arc<dyn Tool>),
    Namespace(Arc<dyn ToolModule>),
    Value(Value),
}

impl ModuleItem {
    fn kind(&self) -> &'static str {
        match self {
            Self::Tool(_) => "tool",
            Self::Namespace(_) => "namespace",
            Self::Value(_) => "value",
        }
    }
}

pub trait ToolModule: Send + Sync {
    fn attribute(&self, name: &str) -> Option<ModuleItem>;
}

pub trait ToolLoader: Send + Sync {
    fn load_module(&self, module: &str) -> Result<Arc<dyn ToolModule>, ToolError>;
}

impl<F> ToolLoader for F
where
    F: Fn(&str) -> Result<Arc<dyn ToolModule>, ToolError> + Send + Sync,
{
    fn load_module(&self, module: &str) -> Result<Arc<dyn ToolModule>, ToolError> {
        self(module)
    }
}

#[derive(Clone)]
enum NamespaceNode {
    Tool(Arc<dyn Tool>),
    Namespace(Arc<ToolNamespace>),
    Value(Value),
}

/// In-memory module tree. Serves as both a loader (dotted module paths walk
/// nested namespaces) and a module.
#[derive(Clone, Default)]
pub struct ToolNamespace {
    nodes: BTreeMap<String, NamespaceNode>,
}

impl ToolNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tool<T>(&mut self, path: &str, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.insert_node(path, NamespaceNode::Tool(Arc::new(tool)))
    }

    pub fn insert_shared_tool(&mut self, path: &str, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        self.insert_node(path, NamespaceNode::Tool(tool))
    }

    pub fn insert_value(&mut self, path: &str, value: Value) -> Result<(), ToolError> {
        self.insert_node(path, NamespaceNode::Value(value))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert_node(&mut self, path: &str, node: NamespaceNode) -> Result<(), ToolError> {
        let segments = path.split('.').collect::<Vec<_>>();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ToolError::configuration(format!(
                "namespace path '{path}' has an empty segment"
            )));
        }

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ToolError::configuration("namespace path is empty"))?;

        let mut current = self;
        for segment in parents {
            let child = current
                .nodes
                .entry((*segment).to_string())
                .or_insert_with(|| NamespaceNode::Namespace(Arc::new(ToolNamespace::new())));
            current = match child {
                NamespaceNode::Namespace(namespace) => Arc::make_mut(namespace),
                _ => {
                    return Err(ToolError::configuration(format!(
                        "'{segment}' in '{path}' is not a namespace"
                    )));
                }
            };
        }

        current.nodes.insert((*last).to_string(), node);
        Ok(())
    }
}

impl ToolModule for ToolNamespace {
    fn attribute(&self, name: &str) -> Option<ModuleItem> {
        self.nodes.get(name).map(|node| match node {
            NamespaceNode::Tool(tool) => ModuleItem::Tool(Arc::clone(tool)),
            NamespaceNode::Namespace(namespace) => {
                ModuleItem::Namespace(Arc::clone(namespace) as Arc<dyn ToolModule>)
            }
            NamespaceNode::Value(value) => ModuleItem::Value(value.clone()),
        })
    }
}

impl ToolLoader for ToolNamespace {
    fn load_module(&self, module: &str) -> Result<Arc<dyn ToolModule>, ToolError> {
        let mut current: Option<Arc<ToolNamespace>> = None;
        for segment in module.split('.') {
            let node = match &current {
                Some(namespace) => namespace.nodes.get(segment),
                None => self.nodes.get(segment),
            };
            current = match node {
                Some(NamespaceNode::Namespace(namespace)) => Some(Arc::clone(namespace)),
                _ => {
                    return Err(ToolError::resolution(format!(
                        "no module named '{module}'"
                    )));
                }
            };
        }

        current
            .map(|namespace| namespace as Arc<dyn ToolModule>)
            .ok_or_else(|| ToolError::resolution(format!("no module named '{module}'")))
    }
}

/// Walks `path` through `loader` to a callable.
pub fn resolve_path(path: &str, loader: &dyn ToolLoader) -> Result<Arc<dyn Tool>, ToolError> {
    let parsed = ToolPath::parse(path)?;
    let mut item = ModuleItem::Namespace(loader.load_module(&parsed.module)?);
    let mut walked = parsed.module.clone();

    for segment in &parsed.attributes {
        let ModuleItem::Namespace(module) = &item else {
            return Err(ToolError::resolution(format!(
                "'{walked}' is a {} and has no attribute '{segment}'",
                item.kind()
            )));
        };
        let next = module.attribute(segment).ok_or_else(|| {
            ToolError::resolution(format!("'{walked}' has no attribute '{segment}'"))
        })?;
        item = next;
        walked = format!("{walked}.{segment}");
    }

    match item {
        ModuleItem::Tool(tool) => Ok(tool),
        other => Err(ToolError::not_callable(format!(
            "'{path}' resolved to a {}, which is not callable",
            other.kind()
        ))),
    }
}

pub(crate) fn warn_declared(tool_name: &str) {
    tracing::warn!(
        phase = "tool",
        event = "declared_without_implementation",
        tool_name,
        "no implementation provided for tool"
    );
}

/// Produces the registry entry for one registration.
pub fn resolve_tool(
    registration: ToolRegistration,
    loader: Option<&dyn ToolLoader>,
) -> Result<ToolEntry, ToolError> {
    let ToolRegistration { spec, schema } = registration;

    let tool = match spec {
        ToolSpec::Declared => {
            let schema = schema.ok_or_else(|| {
                ToolError::configuration("no schema provided for declared tool")
            })?;
            warn_declared(&schema.name);
            return Ok(ToolEntry::declared(schema));
        }
        ToolSpec::Function(tool) => tool,
        ToolSpec::Path(path) => {
            let loader = loader.ok_or_else(|| {
                ToolError::resolution(format!("no tool loader available to resolve '{path}'"))
            })?;
            resolve_path(&path, loader)?
        }
    };

    let schema = schema
        .or_else(|| tool.schema())
        .ok_or_else(|| ToolError::configuration("no schema provided for tool function"))?;

    Ok(ToolEntry::available(tool, schema))
}
