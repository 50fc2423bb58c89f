//! Tool trait contract for registry-managed callables.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::ToolSchema;
//! use ttooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::sync(|args| Ok(json!(args.len())))
//!     .with_schema(ToolSchema::new("count_args", "Counts its arguments"));
//!
//! assert_eq!(tool.schema().map(|schema| schema.name), Some("count_args".to_string()));
//! assert!(!tool.is_async());
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tcommon::BoxFuture;
use tprotocol::ToolSchema;

use crate::{ToolArguments, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    /// Schema attached to the implementation. An explicit schema supplied at
    /// registration always takes precedence.
    fn schema(&self) -> Option<ToolSchema> {
        None
    }

    fn signature(&self) -> ToolSignature {
        ToolSignature::Opaque
    }

    /// Whether invocation may suspend. Synchronous tools finish on first poll.
    fn is_async(&self) -> bool {
        true
    }

    fn invoke<'a>(&'a self, arguments: ToolArguments) -> ToolFuture<'a, Result<Value, ToolError>>;
}

impl Debug for dyn Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("schema", &self.schema().map(|schema| schema.name))
            .field("signature", &self.signature())
            .field("is_async", &self.is_async())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

impl ParameterKind {
    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::VarPositional | Self::VarKeyword)
    }

    pub fn accepts_keyword(&self) -> bool {
        matches!(
            self,
            Self::PositionalOrKeyword | Self::KeywordOnly | Self::VarKeyword
        )
    }

    pub fn accepts_positional(&self) -> bool {
        matches!(
            self,
            Self::PositionalOnly | Self::PositionalOrKeyword | Self::VarPositional
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Declared parameters of a tool, consulted before invocation to pick how
/// arguments are bound.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolSignature {
    /// Parameters are unknown; arguments are bound by name and a single
    /// argument is retried positionally if the tool rejects names.
    #[default]
    Opaque,
    Declared(Vec<Parameter>),
}

impl ToolSignature {
    /// Parameters bindable by name, in order.
    pub fn keyword<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Declared(
            names
                .into_iter()
                .map(|name| Parameter::new(name, ParameterKind::PositionalOrKeyword))
                .collect(),
        )
    }

    /// Parameters that can only be bound by position.
    pub fn positional_only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Declared(
            names
                .into_iter()
                .map(|name| Parameter::new(name, ParameterKind::PositionalOnly))
                .collect(),
        )
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque)
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Opaque => &[],
            Self::Declared(parameters) => parameters,
        }
    }

    pub fn accepts_keywords(&self) -> bool {
        match self {
            Self::Opaque => true,
            Self::Declared(parameters) => parameters.iter().any(|p| p.kind.accepts_keyword()),
        }
    }

    /// True when exactly one non-variadic parameter exists and it takes a position.
    pub fn has_single_positional(&self) -> bool {
        let mut fixed = self.parameters().iter().filter(|p| !p.kind.is_variadic());
        matches!(
            (fixed.next(), fixed.next()),
            (Some(parameter), None) if parameter.kind.accepts_positional()
        )
    }
}

type SyncHandler = dyn Fn(ToolArguments) -> Result<Value, ToolError> + Send + Sync;

type AsyncHandler =
    dyn Fn(ToolArguments) -> ToolFuture<'static, Result<Value, ToolError>> + Send + Sync;

#[derive(Clone)]
enum ToolHandler {
    Sync(Arc<SyncHandler>),
    Async(Arc<AsyncHandler>),
}

/// Closure-backed tool.
#[derive(Clone)]
pub struct FunctionTool {
    schema: Option<ToolSchema>,
    signature: ToolSignature,
    handler: ToolHandler,
}

impl FunctionTool {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<AsyncHandler> = Arc::new(move |arguments| Box::pin(handler(arguments)));

        Self {
            schema: None,
            signature: ToolSignature::Opaque,
            handler: ToolHandler::Async(handler),
        }
    }

    pub fn sync<F>(handler: F) -> Self
    where
        F: Fn(ToolArguments) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            schema: None,
            signature: ToolSignature::Opaque,
            handler: ToolHandler::Sync(Arc::new(handler)),
        }
    }

    pub fn with_schema(mut self, schema: ToolSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_signature(mut self, signature: ToolSignature) -> Self {
        self.signature = signature;
        self
    }
}

impl Tool for FunctionTool {
    fn schema(&self) -> Option<ToolSchema> {
        self.schema.clone()
    }

    fn signature(&self) -> ToolSignature {
        self.signature.clone()
    }

    fn is_async(&self) -> bool {
        matches!(self.handler, ToolHandler::Async(_))
    }

    fn invoke<'a>(&'a self, arguments: ToolArguments) -> ToolFuture<'a, Result<Value, ToolError>> {
        match &self.handler {
            ToolHandler::Sync(handler) => {
                let output = handler(arguments);
                Box::pin(async move { output })
            }
            ToolHandler::Async(handler) => handler(arguments),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shared_tools_format_with_their_schema_name() {
        let tool: Arc<dyn Tool> = Arc::new(
            FunctionTool::sync(|_| Ok(json!(null))).with_schema(ToolSchema::new("noop", "Nothing")),
        );
        let text = format!("{tool:?}");
        assert!(text.contains("Some(\"noop\")"), "{text}");
        assert!(text.contains("is_async: false"), "{text}");
    }

    #[test]
    fn single_positional_ignores_variadics() {
        let signature = ToolSignature::Declared(vec![
            Parameter::new("value", ParameterKind::PositionalOnly),
            Parameter::new("rest", ParameterKind::VarPositional),
        ]);
        assert!(signature.has_single_positional());
        assert!(!signature.accepts_keywords());

        let two = ToolSignature::positional_only(["a", "b"]);
        assert!(!two.has_single_positional());

        let keyword_only = ToolSignature::Declared(vec![Parameter::new(
            "flag",
            ParameterKind::KeywordOnly,
        )]);
        assert!(!keyword_only.has_single_positional());
        assert!(keyword_only.accepts_keywords());
    }

    #[test]
    fn opaque_signature_assumes_keywords() {
        let signature = ToolSignature::default();
        assert!(signature.is_opaque());
        assert!(signature.accepts_keywords());
        assert!(!signature.has_single_positional());
    }

    #[tokio::test]
    async fn sync_and_async_handlers_both_invoke() {
        let sync_tool = FunctionTool::sync(|args| Ok(json!(args.len())));
        let async_tool = FunctionTool::new(|args| async move { Ok(json!(args.len() * 10)) });

        assert!(!sync_tool.is_async());
        assert!(async_tool.is_async());

        let args = ToolArguments::positional(vec![json!(1), json!(2)]);
        assert_eq!(
            sync_tool.invoke(args.clone()).await.expect("sync should succeed"),
            json!(2)
        );
        assert_eq!(
            async_tool.invoke(args).await.expect("async should succeed"),
            json!(20)
        );
    }
}
