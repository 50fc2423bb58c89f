//! Common imports for most tether applications.

pub use crate::{tether_messages, tether_msg};
pub use crate::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, ClientConfig, DispatchOptions,
    FunctionTool, ModelFlags, ProtocolError, RequestToolSet, Role, SharedToolRegistry,
    StringTable, Tool, ToolArguments, ToolCallInstruction, ToolCallOutcome, ToolCallResult,
    ToolClient, ToolClientBuilder, ToolDispatcher, ToolError, ToolErrorKind, ToolFuture,
    ToolLoader, ToolNamespace, ToolReference, ToolRegistration, ToolRegistry, ToolSchema,
    ToolSignature, ToolSpec, extract_content, model_flags,
};
