//! Tracing-based hooks for the tool call lifecycle.
//!
//! ```rust
//! use tobserve::TracingToolHooks;
//! use ttooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = TracingToolHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;
use tprotocol::ToolCallInstruction;
use ttooling::{SkipReason, ToolArguments, ToolError, ToolRuntimeHooks};

/// Logs the callee and arguments before each call and the result after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToolHooks;

impl ToolRuntimeHooks for TracingToolHooks {
    fn on_call_start(&self, tool_call: &ToolCallInstruction, arguments: &ToolArguments) {
        tracing::info!(
            phase = "tool",
            event = "call_start",
            tool_name = tool_call.function.name,
            tool_call_id = tool_call.id,
            arguments = %arguments.to_value()
        );
    }

    fn on_call_success(&self, tool_call: &ToolCallInstruction, output: &Value, elapsed: Duration) {
        tracing::info!(
            phase = "tool",
            event = "call_success",
            tool_name = tool_call.function.name,
            tool_call_id = tool_call.id,
            elapsed_ms = elapsed.as_millis() as u64,
            result = %output
        );
    }

    fn on_call_skipped(&self, tool_call: &ToolCallInstruction, reason: SkipReason) {
        tracing::debug!(
            phase = "tool",
            event = "call_skipped",
            tool_name = tool_call.function.name,
            tool_call_id = tool_call.id,
            reason = ?reason
        );
    }

    fn on_call_failure(&self, tool_call: &ToolCallInstruction, error: &ToolError, elapsed: Duration) {
        tracing::error!(
            phase = "tool",
            event = "call_failure",
            tool_name = tool_call.function.name,
            tool_call_id = tool_call.id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
