//! Wire types for talking to a local tool-calling inference server.
//!
//! Covers chat completions and the tool call instructions they carry,
//! streamed completion chunks, tool schemas, model-family flags, and the
//! prompt string table.

mod completion;
mod error;
mod flags;
mod message;
mod schema;
mod stream;
mod strings;

pub mod prelude;

pub use completion::{
    AssistantMessage, ChatCompletion, CompletionChoice, FunctionCall, ToolCallInstruction,
};
pub use error::{ProtocolError, ProtocolErrorKind};
pub use flags::{MODEL_TYPE_FIELD, ModelFlags, model_flags};
pub use message::{ChatMessage, Role, ToolChoice};
pub use schema::{ToolSchema, ToolSchemaBuilder};
pub use stream::{
    ChatCompletionChunk, ChunkChoice, ChunkStream, ContentDelta, ContentStream, VecChunkStream,
    extract_content,
};
pub use strings::StringTable;
