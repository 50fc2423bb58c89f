//! Common `tprotocol` imports for downstream crates.

pub use crate::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, ContentStream, FunctionCall, ModelFlags,
    ProtocolError, ProtocolErrorKind, Role, StringTable, ToolCallInstruction, ToolChoice,
    ToolSchema, extract_content, model_flags,
};
pub use tcommon::BoxFuture;
