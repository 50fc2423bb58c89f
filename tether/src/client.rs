//! Client-side tool-calling state: the registry, dispatch settings and the
//! helpers that shape prompts and tool results for a model family.
//!
//! ```rust
//! use tether::{Role, ToolClient, ToolSchema};
//!
//! let client = ToolClient::builder()
//!     .model_type("gemma2")
//!     .build()
//!     .expect("client should build");
//! client
//!     .registry()
//!     .declare(ToolSchema::new("lookup", "Looks up a record"));
//!
//! let toolset = client.resolve_tools(["lookup"]).expect("lookup is registered");
//! let message = client.tool_system_message(&toolset).expect("prompt renders");
//! assert_eq!(message.role, Role::User);
//! assert!(message.content.contains("\"lookup\""));
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tobserve::{MetricsToolHooks, SafeToolHooks, TracingToolHooks};
use tprotocol::{
    ChatCompletion, ChatMessage, ModelFlags, Role, StringTable, ToolCallInstruction, model_flags,
};
use ttooling::{
    CompositeToolHooks, DispatchOptions, NoopToolRuntimeHooks, RequestToolSet, SharedToolRegistry,
    ToolCallOutcome, ToolCallResult, ToolDispatcher, ToolError, ToolLoader, ToolReference,
    ToolRegistration, ToolRegistry, ToolRuntimeHooks,
};

use crate::ClientConfig;

pub struct ToolClientBuilder {
    model_type: Option<String>,
    model_flags: Option<ModelFlags>,
    sysmsg_leadin: Option<String>,
    trace: bool,
    metrics: bool,
    remove_used_tools: bool,
    loader: Option<Arc<dyn ToolLoader>>,
    tools: Vec<ToolRegistration>,
    strings: Option<StringTable>,
    options: DispatchOptions,
    hooks: Vec<Arc<dyn ToolRuntimeHooks>>,
}

impl Default for ToolClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolClientBuilder {
    pub fn new() -> Self {
        Self {
            model_type: None,
            model_flags: None,
            sysmsg_leadin: None,
            trace: false,
            metrics: false,
            remove_used_tools: true,
            loader: None,
            tools: Vec::new(),
            strings: None,
            options: DispatchOptions::default(),
            hooks: Vec::new(),
        }
    }

    pub fn model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Overrides the flags otherwise looked up from the model type.
    pub fn model_flags(mut self, flags: ModelFlags) -> Self {
        self.model_flags = Some(flags);
        self
    }

    pub fn sysmsg_leadin(mut self, leadin: impl Into<String>) -> Self {
        self.sysmsg_leadin = Some(leadin.into());
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn remove_used_tools(mut self, remove_used_tools: bool) -> Self {
        self.remove_used_tools = remove_used_tools;
        self
    }

    pub fn loader(mut self, loader: Arc<dyn ToolLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn tool(mut self, registration: impl Into<ToolRegistration>) -> Self {
        self.tools.push(registration.into());
        self
    }

    pub fn tools<I, R>(mut self, registrations: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolRegistration>,
    {
        self.tools.extend(registrations.into_iter().map(Into::into));
        self
    }

    pub fn strings(mut self, strings: StringTable) -> Self {
        self.strings = Some(strings);
        self
    }

    pub fn dispatch_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    /// Resolves the initial tools in order; the first failure aborts the build.
    pub fn build(self) -> Result<ToolClient, ToolError> {
        let strings = match self.strings {
            Some(strings) => strings,
            None => StringTable::bundled()?,
        };

        let mut registry = match self.loader {
            Some(loader) => ToolRegistry::with_loader(loader),
            None => ToolRegistry::new(),
        };
        registry.register_many(self.tools)?;

        let mut composite = CompositeToolHooks::new();
        if self.trace {
            composite.push(Arc::new(SafeToolHooks::new(TracingToolHooks)));
        }
        if self.metrics {
            composite.push(Arc::new(SafeToolHooks::new(MetricsToolHooks)));
        }
        for hooks in self.hooks {
            composite.push(hooks);
        }
        let hooks: Arc<dyn ToolRuntimeHooks> = if composite.is_empty() {
            Arc::new(NoopToolRuntimeHooks)
        } else {
            Arc::new(composite)
        };

        let flags = self.model_flags.unwrap_or_else(|| {
            self.model_type
                .as_deref()
                .map(model_flags)
                .unwrap_or(ModelFlags::DEFAULT)
        });

        tracing::debug!(
            phase = "client",
            event = "built",
            model_type = self.model_type.as_deref().unwrap_or("unspecified"),
            model_flags = ?flags,
            tools = registry.len(),
            "tool client ready"
        );

        Ok(ToolClient {
            model_type: self.model_type,
            model_flags: flags,
            sysmsg_leadin: self.sysmsg_leadin,
            trace: self.trace,
            remove_used_tools: self.remove_used_tools,
            registry: SharedToolRegistry::new(registry),
            strings,
            dispatcher: ToolDispatcher::from_options(&self.options, hooks),
            options: self.options,
        })
    }
}

#[derive(Clone)]
pub struct ToolClient {
    model_type: Option<String>,
    model_flags: ModelFlags,
    sysmsg_leadin: Option<String>,
    trace: bool,
    remove_used_tools: bool,
    registry: SharedToolRegistry,
    strings: StringTable,
    options: DispatchOptions,
    dispatcher: ToolDispatcher,
}

impl Debug for ToolClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolClient")
            .field("model_type", &self.model_type)
            .field("model_flags", &self.model_flags)
            .field("trace", &self.trace)
            .field("remove_used_tools", &self.remove_used_tools)
            .field("toolset", &self.registry.toolset())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ToolClient {
    pub fn builder() -> ToolClientBuilder {
        ToolClientBuilder::new()
    }

    /// Builds a client from loaded configuration, resolving its tool paths
    /// through `loader`.
    pub fn from_config(
        config: &ClientConfig,
        loader: Arc<dyn ToolLoader>,
    ) -> Result<Self, ToolError> {
        let mut builder = Self::builder()
            .trace(config.trace)
            .metrics(config.metrics)
            .remove_used_tools(config.remove_used_tools)
            .loader(loader)
            .dispatch_options(config.dispatch_options())
            .tools(config.tools.iter().map(String::as_str));

        if let Some(model_type) = &config.model_type {
            builder = builder.model_type(model_type.as_str());
        }
        if let Some(leadin) = &config.sysmsg_leadin {
            builder = builder.sysmsg_leadin(leadin.as_str());
        }

        builder.build()
    }

    pub fn model_type(&self) -> Option<&str> {
        self.model_type.as_deref()
    }

    pub fn model_flags(&self) -> ModelFlags {
        self.model_flags
    }

    pub fn sysmsg_leadin(&self) -> Option<&str> {
        self.sysmsg_leadin.as_deref()
    }

    pub fn trace(&self) -> bool {
        self.trace
    }

    pub fn remove_used_tools(&self) -> bool {
        self.remove_used_tools
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        self.options
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn registry(&self) -> &SharedToolRegistry {
        &self.registry
    }

    pub fn register_tool(&self, registration: impl Into<ToolRegistration>) -> Result<(), ToolError> {
        self.registry.register(registration)
    }

    pub fn register_tools<I, R>(&self, registrations: I) -> Result<(), ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolRegistration>,
    {
        self.registry.register_many(registrations)
    }

    /// Registered tool names, sorted.
    pub fn toolset(&self) -> Vec<String> {
        self.registry.toolset()
    }

    pub fn clear_tools(&self) {
        self.registry.clear();
    }

    pub fn resolve_tools<I, R>(&self, references: I) -> Result<RequestToolSet, ToolError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ToolReference>,
    {
        self.registry.select(references)
    }

    pub async fn execute_tool_calls(
        &self,
        completion: &ChatCompletion,
        toolset: &RequestToolSet,
    ) -> Result<Vec<ToolCallResult>, ToolError> {
        self.dispatcher.execute_tool_calls(completion, toolset).await
    }

    pub async fn dispatch_outcomes(
        &self,
        tool_calls: &[ToolCallInstruction],
        toolset: &RequestToolSet,
    ) -> Vec<ToolCallOutcome> {
        self.dispatcher.dispatch_outcomes(tool_calls, toolset).await
    }

    /// Text priming the model to call the tools in `toolset`.
    pub fn tool_system_prompt(&self, toolset: &RequestToolSet) -> Result<String, ToolError> {
        let leadin = match &self.sysmsg_leadin {
            Some(leadin) => leadin.clone(),
            None if toolset.len() == 1 => self.strings.require("one_tool_prompt_leadin")?.to_string(),
            None => self.strings.require("multi_tool_prompt_leadin")?.to_string(),
        };

        let schemas = toolset
            .schemas()
            .iter()
            .map(|schema| schema.to_function_value())
            .collect::<Vec<_>>();
        let schemas = serde_json::to_string_pretty(&schemas)
            .map_err(|err| ToolError::other(format!("failed to serialize tool schemas: {err}")))?;
        let body = self
            .strings
            .render("tool_prompt_schemas", &[("schemas", &schemas)])?;
        let tail = self.strings.require("tool_prompt_tail")?;

        Ok(format!("{leadin}\n\n{body}\n\n{tail}"))
    }

    pub fn tool_system_message(&self, toolset: &RequestToolSet) -> Result<ChatMessage, ToolError> {
        let role = if self.model_flags.contains(ModelFlags::NO_SYSTEM_ROLE) {
            Role::User
        } else {
            Role::System
        };
        Ok(ChatMessage::new(role, self.tool_system_prompt(toolset)?))
    }

    /// Messages that hand tool results back to the model.
    pub fn tool_result_messages(
        &self,
        results: &[ToolCallResult],
    ) -> Result<Vec<ChatMessage>, ToolError> {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        if self.model_flags.contains(ModelFlags::TOOL_RESPONSE) {
            return Ok(results
                .iter()
                .map(|result| {
                    ChatMessage::tool(&result.tool_call_id, &result.tool_name, result.output_text())
                })
                .collect());
        }

        let mut lines = vec![self.strings.require("tool_results_leadin")?.to_string()];
        for result in results {
            let output = result.output_text();
            lines.push(self.strings.render(
                "tool_result_line",
                &[
                    ("name", result.tool_name.as_str()),
                    ("call_id", result.tool_call_id.as_str()),
                    ("result", output.as_str()),
                ],
            )?);
        }

        // The previous turn was the assistant's tool call.
        let role = if self.model_flags.contains(ModelFlags::USER_ASSISTANT_ALT) {
            Role::User
        } else {
            Role::Assistant
        };
        Ok(vec![ChatMessage::new(role, lines.join("\n"))])
    }

    /// Drops tools that produced a result from `toolset` when
    /// `remove_used_tools` is set. Returns how many were removed.
    pub fn retire_used_tools(&self, toolset: &mut RequestToolSet, results: &[ToolCallResult]) -> usize {
        if !self.remove_used_tools {
            return 0;
        }

        results
            .iter()
            .filter(|result| toolset.remove(&result.tool_name).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tprotocol::ToolSchema;

    use super::*;

    fn full_toolset(client: &ToolClient) -> RequestToolSet {
        client
            .resolve_tools(client.toolset())
            .expect("all tools resolve")
    }

    fn results() -> Vec<ToolCallResult> {
        vec![
            ToolCallResult::new("call_1", "add", json!(3)),
            ToolCallResult::new("call_2", "echo", json!("hi")),
        ]
    }

    #[test]
    fn flags_follow_model_type_unless_overridden() {
        let client = ToolClient::builder()
            .model_type("llama")
            .build()
            .expect("client should build");
        assert!(client.model_flags().contains(ModelFlags::NO_SYSTEM_ROLE));
        assert_eq!(client.model_type(), Some("llama"));

        let client = ToolClient::builder()
            .model_type("llama")
            .model_flags(ModelFlags::TOOL_RESPONSE)
            .build()
            .expect("client should build");
        assert_eq!(client.model_flags(), ModelFlags::TOOL_RESPONSE);

        let client = ToolClient::builder().build().expect("client should build");
        assert!(client.model_flags().is_empty());
        assert!(client.remove_used_tools());
    }

    #[test]
    fn system_prompt_leadin_depends_on_tool_count() {
        let client = ToolClient::builder().build().expect("client should build");
        let strings = StringTable::bundled().expect("bundled strings");
        client.registry().declare(ToolSchema::new("add", "Adds"));
        client.registry().declare(ToolSchema::new("echo", "Echoes"));

        let one = client.resolve_tools(["add"]).expect("add is registered");
        let prompt = client.tool_system_prompt(&one).expect("prompt renders");
        assert!(prompt.starts_with(strings.get("one_tool_prompt_leadin").expect("leadin")));
        assert!(prompt.contains("\"add\""));
        assert!(!prompt.contains("\"echo\""));

        let both = client.resolve_tools(["add", "echo"]).expect("both registered");
        let prompt = client.tool_system_prompt(&both).expect("prompt renders");
        assert!(prompt.starts_with(strings.get("multi_tool_prompt_leadin").expect("leadin")));
        assert!(prompt.ends_with(strings.get("tool_prompt_tail").expect("tail")));
    }

    #[test]
    fn leadin_override_replaces_bundled_text() {
        let client = ToolClient::builder()
            .sysmsg_leadin("You may call tools.")
            .build()
            .expect("client should build");
        client.registry().declare(ToolSchema::new("add", "Adds"));

        let toolset = client.resolve_tools(["add"]).expect("add is registered");
        let message = client.tool_system_message(&toolset).expect("prompt renders");
        assert_eq!(message.role, Role::System);
        assert!(message.content.starts_with("You may call tools.\n\n"));
    }

    #[test]
    fn tool_results_become_tool_messages_when_supported() {
        let client = ToolClient::builder()
            .model_flags(ModelFlags::TOOL_RESPONSE)
            .build()
            .expect("client should build");

        let messages = client.tool_result_messages(&results()).expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::Tool);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(messages[0].content, "3");
        assert_eq!(messages[1].name.as_deref(), Some("echo"));
        assert_eq!(messages[1].content, "hi");
    }

    #[test]
    fn placeholder_text_in_call_ids_reaches_the_model_verbatim() {
        let client = ToolClient::builder()
            .model_type("llama")
            .build()
            .expect("client should build");

        let results = [ToolCallResult::new("id{result}", "add{name}", json!(3))];
        let messages = client.tool_result_messages(&results).expect("messages");
        assert!(
            messages[0]
                .content
                .ends_with("Result of add{name} (call id{result}): 3"),
            "{}",
            messages[0].content
        );
    }

    #[test]
    fn tool_results_are_summarised_for_strict_chat_models() {
        let client = ToolClient::builder()
            .model_type("mistral")
            .build()
            .expect("client should build");

        let messages = client.tool_result_messages(&results()).expect("messages");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.contains("Result of add (call call_1): 3"));
        assert!(messages[0].content.contains("Result of echo (call call_2): hi"));

        let client = ToolClient::builder().build().expect("client should build");
        let messages = client.tool_result_messages(&results()).expect("messages");
        assert_eq!(messages[0].role, Role::Assistant);
        assert!(client.tool_result_messages(&[]).expect("messages").is_empty());
    }

    #[test]
    fn used_tools_are_retired_only_when_enabled() {
        let client = ToolClient::builder().build().expect("client should build");
        client.registry().declare(ToolSchema::new("add", "Adds"));
        client.registry().declare(ToolSchema::new("echo", "Echoes"));
        client.registry().declare(ToolSchema::new("other", "Other"));

        let mut toolset = full_toolset(&client);
        assert_eq!(client.retire_used_tools(&mut toolset, &results()), 2);
        assert_eq!(toolset.names(), vec!["other".to_string()]);

        let keeping = ToolClient::builder()
            .remove_used_tools(false)
            .build()
            .expect("client should build");
        let mut toolset = full_toolset(&client);
        assert_eq!(keeping.retire_used_tools(&mut toolset, &results()), 0);
        assert_eq!(toolset.len(), 3);
    }
}
