//! Client runtime for tool calling against a local inference server.
//!
//! This crate is the single dependency for most applications. It re-exports the
//! tether workspace crates and adds [`ToolClient`], which owns the tool registry
//! and dispatch settings and shapes prompts and tool results for a model family.
//!
//! ```rust
//! use serde_json::json;
//! use tether::prelude::*;
//!
//! let client = ToolClient::builder().build().expect("client should build");
//! client
//!     .registry()
//!     .declare(ToolSchema::new("lookup", "Looks up a record"));
//! client
//!     .register_tool(ToolRegistration::function(
//!         FunctionTool::sync(|args| Ok(args.to_value()))
//!             .with_schema(ToolSchema::new("echo", "Echoes its arguments")),
//!     ))
//!     .expect("echo has a schema");
//!
//! let toolset = client.resolve_tools(["echo"]).expect("echo is registered");
//! let completion = ChatCompletion::from_value(json!({
//!     "choices": [{"message": {"tool_calls": [
//!         {"id": "call_1", "function": {"name": "echo", "arguments": "{\"text\": \"hi\"}"}}
//!     ]}}]
//! }))
//! .expect("completion should parse");
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let results = runtime
//!     .block_on(client.execute_tool_calls(&completion, &toolset))
//!     .expect("dispatch should succeed");
//! assert_eq!(results[0].output, json!({"text": "hi"}));
//! ```

mod client;
mod config;
mod macros;

pub mod prelude;

pub use tcommon;
pub use tobserve;
pub use tprotocol;
pub use ttooling;

pub use client::{ToolClient, ToolClientBuilder};
pub use config::{ClientConfig, DispatchConfig};

pub use tcommon::{BoxFuture, Registry};
pub use tobserve::{MetricsToolHooks, SafeToolHooks, TracingToolHooks};
pub use tprotocol::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, ContentStream, FunctionCall,
    MODEL_TYPE_FIELD, ModelFlags, ProtocolError, ProtocolErrorKind, Role, StringTable,
    ToolCallInstruction, ToolChoice, ToolSchema, extract_content, model_flags,
};
pub use ttooling::{
    CompositeToolHooks, DefaultToolRuntime, DispatchOptions, FunctionTool, NoopToolRuntimeHooks,
    OutcomeStatus, RequestToolSet, SharedToolRegistry, SkipReason, Tool, ToolArguments,
    ToolCallOutcome, ToolCallResult, ToolDispatcher, ToolEntry, ToolError, ToolErrorKind,
    ToolFuture, ToolLoader, ToolModule, ToolNamespace, ToolReference, ToolRegistration,
    ToolRegistry, ToolRuntime, ToolRuntimeHooks, ToolSignature, ToolSpec, parse_json_object,
    parse_json_value, required_number, required_string,
};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn tether_msg_macro_creates_expected_message() {
        let message = crate::tether_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
        assert!(message.tool_call_id.is_none());
    }

    #[test]
    fn tether_msg_macro_builds_tool_responses() {
        let message = crate::tether_msg!(tool("call_7", "lookup") => "found");
        assert_eq!(message.role, Role::Tool);
        assert_eq!(message.name.as_deref(), Some("lookup"));
        assert_eq!(message.content, "found");
    }

    #[test]
    fn tether_messages_macro_builds_message_vector() {
        let messages = crate::tether_messages![
            system => "You are concise.",
            user => "Add 1 and 2",
            assistant => "3",
        ];

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(crate::tether_messages![].is_empty());
    }
}
