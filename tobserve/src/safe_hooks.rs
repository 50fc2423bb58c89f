use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use serde_json::Value;
use tprotocol::ToolCallInstruction;
use ttooling::{SkipReason, ToolArguments, ToolError, ToolRuntimeHooks};

/// Swallows panics raised by the wrapped hooks so observation never aborts a
/// dispatch.
pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_call_start(&self, tool_call: &ToolCallInstruction, arguments: &ToolArguments) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_call_start(tool_call, arguments)
        }));
    }

    fn on_call_success(&self, tool_call: &ToolCallInstruction, output: &Value, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_call_success(tool_call, output, elapsed)
        }));
    }

    fn on_call_skipped(&self, tool_call: &ToolCallInstruction, reason: SkipReason) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_call_skipped(tool_call, reason)
        }));
    }

    fn on_call_failure(&self, tool_call: &ToolCallInstruction, error: &ToolError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_call_failure(tool_call, error, elapsed)
        }));
    }
}
