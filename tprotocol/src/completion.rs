//! Non-streaming chat completion responses and the tool call instructions they carry.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::ChatCompletion;
//!
//! let completion = ChatCompletion::from_value(json!({
//!     "choices": [{
//!         "message": {
//!             "role": "assistant",
//!             "tool_calls": [
//!                 {"id": "call_1", "function": {"name": "add", "arguments": "{\"a\":1,\"b\":2}"}}
//!             ]
//!         }
//!     }]
//! }))
//! .expect("completion should parse");
//!
//! let call = &completion.tool_calls()[0];
//! assert_eq!(call.function.name, "add");
//! assert_eq!(call.function.decode_arguments().expect("args")["b"], 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ProtocolError, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl ChatCompletion {
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn primary_choice(&self) -> Option<&CompletionChoice> {
        self.choices.first()
    }

    /// Tool call instructions of the primary choice, in the order the model emitted them.
    pub fn tool_calls(&self) -> &[ToolCallInstruction] {
        self.primary_choice()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.tool_calls.as_deref())
            .unwrap_or_default()
    }

    pub fn content(&self) -> Option<&str> {
        self.primary_choice()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<AssistantMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default = "assistant_role")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallInstruction>>,
}

fn assistant_role() -> Role {
    Role::Assistant
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallInstruction {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    pub function: FunctionCall,
}

impl ToolCallInstruction {
    pub fn new(id: impl Into<String>, function: FunctionCall) -> Self {
        Self {
            id: id.into(),
            call_type: Some("function".to_string()),
            function,
        }
    }
}

/// Callee and arguments of one instruction.
///
/// Arguments arrive either pre-decoded (`arguments_obj`) or as serialized JSON
/// text (`arguments`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments_obj: Option<Value>,
}

impl FunctionCall {
    pub fn encoded(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments.into()),
            arguments_obj: None,
        }
    }

    pub fn decoded(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments: None,
            arguments_obj: Some(arguments),
        }
    }

    /// Named arguments of the call, preferring the pre-decoded object.
    pub fn decode_arguments(&self) -> Result<Map<String, Value>, ProtocolError> {
        let value = match (&self.arguments_obj, &self.arguments) {
            (Some(value), _) => value.clone(),
            (None, Some(text)) => serde_json::from_str::<Value>(text).map_err(|err| {
                ProtocolError::decode(format!(
                    "invalid JSON arguments for '{}': {err}",
                    self.name
                ))
            })?,
            (None, None) => {
                return Err(ProtocolError::decode(format!(
                    "tool call '{}' carries no arguments",
                    self.name
                )));
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(ProtocolError::decode(format!(
                "expected JSON object arguments for '{}', got {other}",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ProtocolErrorKind;

    #[test]
    fn completion_without_tool_calls_yields_empty_slice() {
        let completion = ChatCompletion::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}]
        }))
        .expect("completion should parse");

        assert!(completion.tool_calls().is_empty());
        assert_eq!(completion.content(), Some("hi"));

        let empty = ChatCompletion::from_value(json!({"choices": []})).expect("should parse");
        assert!(empty.tool_calls().is_empty());
    }

    #[test]
    fn decoded_arguments_win_over_encoded_text() {
        let call = FunctionCall {
            name: "f".to_string(),
            arguments: Some("{\"x\":1}".to_string()),
            arguments_obj: Some(json!({"x": 2})),
        };

        let args = call.decode_arguments().expect("args should decode");
        assert_eq!(args["x"], 2);
    }

    #[test]
    fn malformed_argument_text_is_a_decode_error() {
        let call = FunctionCall::encoded("f", "{not json");
        let error = call.decode_arguments().expect_err("decode should fail");
        assert_eq!(error.kind, ProtocolErrorKind::Decode);
        assert!(error.message.contains("'f'"));
    }

    #[test]
    fn non_object_and_missing_arguments_are_decode_errors() {
        let list = FunctionCall::encoded("f", "[1, 2]");
        assert_eq!(
            list.decode_arguments().expect_err("list should fail").kind,
            ProtocolErrorKind::Decode
        );

        let missing = FunctionCall {
            name: "f".to_string(),
            arguments: None,
            arguments_obj: None,
        };
        assert_eq!(
            missing.decode_arguments().expect_err("missing should fail").kind,
            ProtocolErrorKind::Decode
        );
    }

    #[test]
    fn instruction_type_round_trips_through_serde() {
        let instruction = ToolCallInstruction::new("call_9", FunctionCall::decoded("g", json!({})));
        let value = serde_json::to_value(&instruction).expect("should serialize");
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["arguments_obj"], json!({}));
    }
}
