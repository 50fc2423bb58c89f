//! Per-call dispatch outcomes and results.

use std::fmt::{Display, Formatter};

use serde_json::Value;
use tprotocol::ToolCallInstruction;

use crate::ToolError;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: Value,
}

impl ToolCallResult {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, output: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            output,
        }
    }

    pub fn from_call(call: &ToolCallInstruction, output: Value) -> Self {
        Self::new(call.id.clone(), call.function.name.clone(), output)
    }

    /// Output as message text: strings verbatim, everything else as JSON.
    pub fn output_text(&self) -> String {
        match &self.output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The callee is not part of the request toolset.
    UnknownTool,
    /// The callee was registered from a schema only.
    NoImplementation,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTool => f.write_str("tool is not in the request toolset"),
            Self::NoImplementation => f.write_str("no implementation provided for tool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    Resolved(Value),
    Skipped(SkipReason),
    Failed(ToolError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallOutcome {
    pub tool_call_id: String,
    pub tool_name: String,
    pub status: OutcomeStatus,
}

impl ToolCallOutcome {
    pub fn new(call: &ToolCallInstruction, status: OutcomeStatus) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.function.name.clone(),
            status,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, OutcomeStatus::Resolved(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }

    /// `Ok(None)` for a skipped call.
    pub fn into_result(self) -> Result<Option<ToolCallResult>, ToolError> {
        match self.status {
            OutcomeStatus::Resolved(output) => Ok(Some(ToolCallResult {
                tool_call_id: self.tool_call_id,
                tool_name: self.tool_name,
                output,
            })),
            OutcomeStatus::Skipped(_) => Ok(None),
            OutcomeStatus::Failed(error) => Err(error),
        }
    }
}
