//! Tool resolution, selection and execution errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tprotocol::{ProtocolError, ProtocolErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// A tool was registered without any schema, or a reference is unusable.
    Configuration,
    /// A tool path could not be parsed, or its module or attribute is missing.
    Resolution,
    /// A tool path resolved to something that cannot be invoked.
    NotCallable,
    /// A request named a tool that is not registered.
    NotFound,
    /// Tool call arguments could not be decoded.
    Decode,
    /// The implementation does not accept named parameters.
    KeywordArgumentsRejected,
    InvalidArguments,
    Execution,
    Timeout,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Configuration, message, false)
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Resolution, message, false)
    }

    pub fn not_callable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotCallable, message, false)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Decode, message, false)
    }

    pub fn keyword_arguments_rejected(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::KeywordArgumentsRejected, message, false)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message, false)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::Configuration
                | ToolErrorKind::NotFound
                | ToolErrorKind::Decode
                | ToolErrorKind::InvalidArguments
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(
                f,
                "{:?} [tool={}, call_id={}]: {}",
                self.kind, tool_name, tool_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

impl From<ProtocolError> for ToolError {
    fn from(value: ProtocolError) -> Self {
        match value.kind {
            ProtocolErrorKind::Decode => ToolError::decode(value.message),
            ProtocolErrorKind::Malformed | ProtocolErrorKind::StringTable => {
                ToolError::configuration(value.message)
            }
            ProtocolErrorKind::Stream => ToolError::other(value.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_methods_report_retryable_and_user_error() {
        let timeout = ToolError::timeout("slow");
        assert!(timeout.is_retryable());
        assert!(!timeout.is_user_error());

        let decode = ToolError::decode("bad args");
        assert!(!decode.is_retryable());
        assert!(decode.is_user_error());

        assert!(!ToolError::resolution("no module").is_user_error());
    }

    #[test]
    fn context_fields_are_included_in_display() {
        let error = ToolError::not_found("missing")
            .with_tool_name("lookup")
            .with_tool_call_id("call_1");

        let rendered = error.to_string();
        assert!(rendered.contains("lookup"));
        assert!(rendered.contains("call_1"));
    }

    #[test]
    fn protocol_errors_map_to_tool_kinds() {
        let decode: ToolError = ProtocolError::decode("bad json").into();
        assert_eq!(decode.kind, ToolErrorKind::Decode);
        assert_eq!(decode.message, "bad json");

        let malformed: ToolError = ProtocolError::malformed("no name").into();
        assert_eq!(malformed.kind, ToolErrorKind::Configuration);
    }
}
