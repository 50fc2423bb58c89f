//! Client configuration loaded from TOML.
//!
//! ```rust
//! use tether::ClientConfig;
//!
//! let config = ClientConfig::parse(
//!     r#"
//!     model_type = "llama"
//!     trace = true
//!     tools = ["weather|forecast.daily"]
//!
//!     [dispatch]
//!     max_concurrency = 4
//!     call_timeout_ms = 5000
//!     "#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.model_type.as_deref(), Some("llama"));
//! assert_eq!(config.dispatch_options().max_concurrency, 4);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ttooling::{DispatchOptions, ToolError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Model family, used to look up chat template flags.
    #[serde(default)]
    pub model_type: Option<String>,
    /// Log each tool call and its result.
    #[serde(default)]
    pub trace: bool,
    /// Record tool call metrics.
    #[serde(default)]
    pub metrics: bool,
    /// Drop a tool from the request toolset once it has been called.
    #[serde(default = "default_remove_used_tools")]
    pub remove_used_tools: bool,
    /// Replaces the bundled lead-in of the tool system prompt.
    #[serde(default)]
    pub sysmsg_leadin: Option<String>,
    /// Tool paths resolved through the client's loader.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

fn default_remove_used_tools() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            model_type: None,
            trace: false,
            metrics: false,
            remove_used_tools: default_remove_used_tools(),
            sysmsg_leadin: None,
            tools: Vec::new(),
            dispatch: DispatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

fn default_max_concurrency() -> usize {
    1
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            call_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ToolError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            ToolError::configuration(format!(
                "failed to read config '{}': {err}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> Result<Self, ToolError> {
        toml::from_str(source)
            .map_err(|err| ToolError::configuration(format!("failed to parse config: {err}")))
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        let options = DispatchOptions::new().with_max_concurrency(self.dispatch.max_concurrency);
        match self.dispatch.call_timeout_ms {
            Some(ms) => options.with_call_timeout(Duration::from_millis(ms)),
            None => options,
        }
    }
}
