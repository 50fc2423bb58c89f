//! Capability layer for resolving, selecting and dispatching tools.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::{ChatCompletion, ToolSchema};
//! use ttooling::{ToolDispatcher, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_sync_fn(ToolSchema::new("add", "Adds two numbers"), |args| {
//!         let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or_default();
//!         let b = args.get("b").and_then(|v| v.as_i64()).unwrap_or_default();
//!         Ok(json!(a + b))
//!     })
//!     .expect("schema is supplied");
//!
//! let toolset = registry.select(["add"]).expect("add is registered");
//! let completion = ChatCompletion::from_value(json!({
//!     "choices": [{"message": {"tool_calls": [
//!         {"id": "call_1", "function": {"name": "add", "arguments_obj": {"a": 1, "b": 2}}}
//!     ]}}]
//! }))
//! .expect("completion should parse");
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let results = runtime
//!     .block_on(ToolDispatcher::default().execute_tool_calls(&completion, &toolset))
//!     .expect("dispatch should succeed");
//! assert_eq!(results[0].output, json!(3));
//! ```

mod args;
mod error;
mod hooks;
mod registry;
mod resolver;
mod runtime;
mod select;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, DispatchOptions, FunctionTool, RequestToolSet, SharedToolRegistry,
        Tool, ToolArguments, ToolCallOutcome, ToolCallResult, ToolDispatcher, ToolError,
        ToolErrorKind, ToolFuture, ToolLoader, ToolNamespace, ToolReference, ToolRegistration,
        ToolRegistry, ToolRuntime, ToolRuntimeHooks, ToolSignature, ToolSpec,
    };
}

pub use args::{
    ToolArguments, bind_arguments, parse_json_object, parse_json_value, required_number,
    required_string,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{CompositeToolHooks, NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::{SharedToolRegistry, ToolEntry, ToolImplementation, ToolRegistry};
pub use resolver::{
    ModuleItem, ToolLoader, ToolModule, ToolNamespace, ToolPath, ToolRegistration, ToolSpec,
    resolve_path, resolve_tool,
};
pub use runtime::{DefaultToolRuntime, DispatchOptions, ToolDispatcher, ToolRuntime};
pub use select::{RequestToolSet, ToolReference};
pub use tool::{FunctionTool, Parameter, ParameterKind, Tool, ToolFuture, ToolSignature};
pub use types::{OutcomeStatus, SkipReason, ToolCallOutcome, ToolCallResult};
