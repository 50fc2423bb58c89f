//! Runtime hooks for tool call lifecycle events.
//!
//! Hooks observe dispatch; they cannot change arguments, results or control flow.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ttooling::{CompositeToolHooks, NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = CompositeToolHooks::new()
//!     .with(Arc::new(NoopToolRuntimeHooks))
//!     .with(Arc::new(NoopToolRuntimeHooks));
//! assert_eq!(hooks.len(), 2);
//! assert_hooks_trait(&hooks);
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tprotocol::ToolCallInstruction;

use crate::{SkipReason, ToolArguments, ToolError};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_call_start(&self, _tool_call: &ToolCallInstruction, _arguments: &ToolArguments) {}

    fn on_call_success(&self, _tool_call: &ToolCallInstruction, _output: &Value, _elapsed: Duration) {}

    fn on_call_skipped(&self, _tool_call: &ToolCallInstruction, _reason: SkipReason) {}

    fn on_call_failure(
        &self,
        _tool_call: &ToolCallInstruction,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}

/// Fans every event out to each inner hook, in insertion order.
#[derive(Clone, Default)]
pub struct CompositeToolHooks {
    hooks: Vec<Arc<dyn ToolRuntimeHooks>>,
}

impl CompositeToolHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn push(&mut self, hooks: Arc<dyn ToolRuntimeHooks>) {
        self.hooks.push(hooks);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl ToolRuntimeHooks for CompositeToolHooks {
    fn on_call_start(&self, tool_call: &ToolCallInstruction, arguments: &ToolArguments) {
        for hooks in &self.hooks {
            hooks.on_call_start(tool_call, arguments);
        }
    }

    fn on_call_success(&self, tool_call: &ToolCallInstruction, output: &Value, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_call_success(tool_call, output, elapsed);
        }
    }

    fn on_call_skipped(&self, tool_call: &ToolCallInstruction, reason: SkipReason) {
        for hooks in &self.hooks {
            hooks.on_call_skipped(tool_call, reason);
        }
    }

    fn on_call_failure(&self, tool_call: &ToolCallInstruction, error: &ToolError, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_call_failure(tool_call, error, elapsed);
        }
    }
}
