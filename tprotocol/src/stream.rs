//! Streaming chat completion chunks and lazy text extraction.
//!
//! Consumers get text fragments in arrival order. Chunks that carry no content
//! (role-only or empty deltas) are skipped rather than ending the stream.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::{ChatCompletionChunk, ContentStream, VecChunkStream, extract_content};
//!
//! let chunk = ChatCompletionChunk::from_value(json!({"choices": [{"delta": {"content": "Hel"}}]}))
//!     .expect("chunk should parse");
//! assert_eq!(chunk.into_content().expect("content"), Some("Hel".to_string()));
//!
//! let empty = ChatCompletionChunk::from_value(json!({"choices": [{"delta": {}}]}))
//!     .expect("chunk should parse");
//! assert_eq!(empty.into_content().expect("content"), None);
//!
//! let _text: ContentStream<'static> = extract_content(VecChunkStream::new(Vec::new()));
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProtocolError, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// One streamed choice. Incremental chunks carry `delta`; servers that send the
/// whole message at once use `message` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ContentDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ContentDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Content of the primary choice, `None` when this chunk carries no text.
    pub fn into_content(self) -> Result<Option<String>, ProtocolError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProtocolError::malformed("stream chunk carried no choices"))?;

        match (choice.delta, choice.message) {
            (Some(delta), _) => Ok(delta.content),
            (None, Some(message)) => Ok(message.content),
            (None, None) => Err(ProtocolError::malformed(
                "stream chunk choice has neither 'delta' nor 'message'",
            )),
        }
    }
}

pub type ChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, ProtocolError>> + Send + 'a>>;

pub type ContentStream<'a> = Pin<Box<dyn Stream<Item = Result<String, ProtocolError>> + Send + 'a>>;

/// Lazily maps a chunk stream to its text fragments.
///
/// The returned stream is forward-only; an upstream error is yielded once and
/// ends the stream.
pub fn extract_content<'a, S>(chunks: S) -> ContentStream<'a>
where
    S: Stream<Item = Result<ChatCompletionChunk, ProtocolError>> + Send + 'a,
{
    let stream = try_stream! {
        let mut chunks = Box::pin(chunks);
        while let Some(chunk) = chunks.next().await {
            if let Some(content) = chunk?.into_content()? {
                yield content;
            }
        }
    };

    Box::pin(stream) as ContentStream<'a>
}

/// In-memory chunk stream, mostly for tests and replaying recorded responses.
#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<ChatCompletionChunk, ProtocolError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<ChatCompletionChunk, ProtocolError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(
            values
                .into_iter()
                .map(ChatCompletionChunk::from_value)
                .collect(),
        )
    }
}

impl Stream for VecChunkStream {
    type Item = Result<ChatCompletionChunk, ProtocolError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ChatCompletionChunk, ProtocolError>>> {
        Poll::Ready(self.chunks.pop_front())
    }
}
