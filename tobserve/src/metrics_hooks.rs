//! Metrics-based hooks for the tool call lifecycle.
//!
//! ```rust
//! use tobserve::MetricsToolHooks;
//! use ttooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsToolHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;
use tprotocol::ToolCallInstruction;
use ttooling::{SkipReason, ToolArguments, ToolError, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsToolHooks;

impl ToolRuntimeHooks for MetricsToolHooks {
    fn on_call_start(&self, tool_call: &ToolCallInstruction, _arguments: &ToolArguments) {
        metrics::counter!(
            "tether_tool_call_start_total",
            "tool_name" => tool_call.function.name.clone()
        )
        .increment(1);
    }

    fn on_call_success(&self, tool_call: &ToolCallInstruction, _output: &Value, elapsed: Duration) {
        metrics::counter!(
            "tether_tool_call_success_total",
            "tool_name" => tool_call.function.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "tether_tool_call_duration_seconds",
            "tool_name" => tool_call.function.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_call_skipped(&self, tool_call: &ToolCallInstruction, reason: SkipReason) {
        metrics::counter!(
            "tether_tool_call_skipped_total",
            "tool_name" => tool_call.function.name.clone(),
            "reason" => format!("{reason:?}")
        )
        .increment(1);
    }

    fn on_call_failure(&self, tool_call: &ToolCallInstruction, error: &ToolError, elapsed: Duration) {
        metrics::counter!(
            "tether_tool_call_failure_total",
            "tool_name" => tool_call.function.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tether_tool_call_duration_seconds",
            "tool_name" => tool_call.function.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
