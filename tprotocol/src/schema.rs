//! Tool schema declarations exposed to the model.
//!
//! ```rust
//! use serde_json::json;
//! use tprotocol::ToolSchema;
//!
//! let schema = ToolSchema::builder("get_weather")
//!     .description("Current weather for a city")
//!     .required_parameter("city", json!({"type": "string"}))
//!     .parameter("units", json!({"type": "string", "enum": ["c", "f"]}))
//!     .build()
//!     .expect("schema should build");
//!
//! assert_eq!(schema.name, "get_weather");
//! assert_eq!(schema.required(), vec!["city".to_string()]);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::ProtocolError;

/// Name, description and JSON parameter schema of one tool.
///
/// Beyond `name`, the contents are passed through to the inference server
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

fn empty_parameters() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: empty_parameters(),
        }
    }

    pub fn builder(name: impl Into<String>) -> ToolSchemaBuilder {
        ToolSchemaBuilder::new(name)
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Parses a raw JSON schema object such as `{"name": "...", "parameters": {...}}`.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        if value.get("name").and_then(Value::as_str).is_none() {
            return Err(ProtocolError::malformed(
                "tool schema requires a string 'name'",
            ));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters,
        })
    }

    /// OpenAI-style `{"type": "function", "function": {...}}` wrapper.
    pub fn to_function_value(&self) -> Value {
        json!({"type": "function", "function": self.to_value()})
    }

    pub fn property_names(&self) -> Vec<String> {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn required(&self) -> Vec<String> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|required| {
                required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn required_parameter(mut self, name: impl Into<String>, schema: Value) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.parameter(name, schema)
    }

    pub fn build(self) -> Result<ToolSchema, ProtocolError> {
        if self.name.trim().is_empty() {
            return Err(ProtocolError::malformed("tool name must not be empty"));
        }

        Ok(ToolSchema {
            name: self.name,
            description: self.description,
            parameters: json!({
                "type": "object",
                "properties": Value::Object(self.properties),
                "required": self.required,
            }),
        })
    }
}
