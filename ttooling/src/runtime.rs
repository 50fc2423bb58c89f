//! Tool runtime trait, the default executor and the ordered call dispatcher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use futures_util::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tprotocol::{ChatCompletion, ToolCallInstruction};

use crate::{
    NoopToolRuntimeHooks, OutcomeStatus, RequestToolSet, SkipReason, Tool, ToolArguments,
    ToolCallOutcome, ToolCallResult, ToolError, ToolErrorKind, ToolFuture, ToolRuntimeHooks,
    bind_arguments,
};

pub trait ToolRuntime: Send + Sync {
    /// Runs one instruction against the request's working set. Never fails as a
    /// whole: decode, skip and invocation problems are reported in the outcome.
    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCallInstruction,
        toolset: &'a RequestToolSet,
    ) -> ToolFuture<'a, ToolCallOutcome>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    hooks: Arc<dyn ToolRuntimeHooks>,
    call_timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(NoopToolRuntimeHooks))
    }
}

impl DefaultToolRuntime {
    pub fn new(hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        Self {
            hooks,
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn hooks(&self) -> Arc<dyn ToolRuntimeHooks> {
        Arc::clone(&self.hooks)
    }

    fn skip(&self, tool_call: &ToolCallInstruction, reason: SkipReason) -> ToolCallOutcome {
        tracing::warn!(
            phase = "tool",
            event = "call_skipped",
            tool_name = %tool_call.function.name,
            tool_call_id = %tool_call.id,
            reason = %reason,
            "skipping tool call"
        );
        self.hooks.on_call_skipped(tool_call, reason);
        ToolCallOutcome::new(tool_call, OutcomeStatus::Skipped(reason))
    }

    async fn invoke(
        &self,
        tool_call: &ToolCallInstruction,
        tool: &dyn Tool,
        arguments: Map<String, Value>,
    ) -> Result<Value, ToolError> {
        let signature = tool.signature();
        let bound = bind_arguments(&signature, arguments)?;
        let fallback = if signature.is_opaque() {
            bound.clone().into_positional_single()
        } else {
            None
        };

        match self.run(tool_call, tool, bound).await {
            Err(error) if error.kind == ToolErrorKind::KeywordArgumentsRejected => {
                let Some(positional) = fallback else {
                    return Err(error);
                };
                tracing::debug!(
                    phase = "tool",
                    event = "positional_retry",
                    tool_name = %tool_call.function.name,
                    tool_call_id = %tool_call.id,
                    "tool rejected named arguments; retrying positionally"
                );
                self.run(tool_call, tool, positional).await
            }
            other => other,
        }
    }

    async fn run(
        &self,
        tool_call: &ToolCallInstruction,
        tool: &dyn Tool,
        arguments: ToolArguments,
    ) -> Result<Value, ToolError> {
        let invocation = tool.invoke(arguments);
        match self.call_timeout {
            Some(limit) if tool.is_async() => match select(invocation, Delay::new(limit)).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(ToolError::timeout(format!(
                    "tool call exceeded {}ms",
                    limit.as_millis()
                ))
                .with_tool_name(tool_call.function.name.clone())
                .with_tool_call_id(tool_call.id.clone())),
            },
            _ => invocation.await,
        }
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: &'a ToolCallInstruction,
        toolset: &'a RequestToolSet,
    ) -> ToolFuture<'a, ToolCallOutcome> {
        Box::pin(async move {
            let arguments = match tool_call.function.decode_arguments() {
                Ok(arguments) => arguments,
                Err(error) => {
                    let error = ToolError::from(error)
                        .with_tool_name(tool_call.function.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks.on_call_failure(tool_call, &error, Duration::ZERO);
                    return ToolCallOutcome::new(tool_call, OutcomeStatus::Failed(error));
                }
            };

            let Some(entry) = toolset.get(&tool_call.function.name) else {
                return self.skip(tool_call, SkipReason::UnknownTool);
            };
            let Some(tool) = entry.implementation() else {
                return self.skip(tool_call, SkipReason::NoImplementation);
            };

            self.hooks
                .on_call_start(tool_call, &ToolArguments::Named(arguments.clone()));
            let started = Instant::now();

            let status = match self.invoke(tool_call, tool.as_ref(), arguments).await {
                Ok(output) => {
                    self.hooks
                        .on_call_success(tool_call, &output, started.elapsed());
                    OutcomeStatus::Resolved(output)
                }
                Err(error) => {
                    self.hooks
                        .on_call_failure(tool_call, &error, started.elapsed());
                    OutcomeStatus::Failed(error)
                }
            };
            ToolCallOutcome::new(tool_call, status)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Calls in flight at once. `1` runs calls strictly one after another.
    pub max_concurrency: usize,
    /// Upper bound for each asynchronous call.
    pub call_timeout: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            call_timeout: None,
        }
    }
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }
}

/// Runs a batch of instructions and returns their outcomes in instruction order,
/// whatever order they complete in.
#[derive(Clone)]
pub struct ToolDispatcher {
    runtime: Arc<dyn ToolRuntime>,
    max_concurrency: usize,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(DefaultToolRuntime::default()))
    }
}

impl ToolDispatcher {
    pub fn new(runtime: Arc<dyn ToolRuntime>) -> Self {
        Self {
            runtime,
            max_concurrency: 1,
        }
    }

    pub fn from_options(options: &DispatchOptions, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        let runtime = DefaultToolRuntime::new(hooks).with_call_timeout(options.call_timeout);
        Self::new(Arc::new(runtime)).with_max_concurrency(options.max_concurrency)
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Every outcome, including skips and failures.
    pub async fn dispatch_outcomes(
        &self,
        tool_calls: &[ToolCallInstruction],
        toolset: &RequestToolSet,
    ) -> Vec<ToolCallOutcome> {
        stream::iter(tool_calls)
            .map(|tool_call| self.runtime.execute(tool_call, toolset))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    /// Results of resolved calls, or the first failure in instruction order.
    /// Calls behind a failure are dropped, or never started when dispatch is
    /// sequential.
    pub async fn execute_calls(
        &self,
        tool_calls: &[ToolCallInstruction],
        toolset: &RequestToolSet,
    ) -> Result<Vec<ToolCallResult>, ToolError> {
        let mut outcomes = stream::iter(tool_calls)
            .map(|tool_call| self.runtime.execute(tool_call, toolset))
            .buffered(self.max_concurrency);

        let mut results = Vec::with_capacity(tool_calls.len());
        while let Some(outcome) = outcomes.next().await {
            if let Some(result) = outcome.into_result()? {
                results.push(result);
            }
        }
        Ok(results)
    }

    /// Dispatches the tool calls of the completion's primary choice.
    pub async fn execute_tool_calls(
        &self,
        completion: &ChatCompletion,
        toolset: &RequestToolSet,
    ) -> Result<Vec<ToolCallResult>, ToolError> {
        self.execute_calls(completion.tool_calls(), toolset).await
    }
}
