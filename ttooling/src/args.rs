//! Tool call arguments and the rules that bind them to a tool signature.
//!
//! ```rust
//! use serde_json::json;
//! use ttooling::{ToolArguments, ToolSignature, bind_arguments, parse_json_object};
//!
//! let args = parse_json_object(r#"{"x":5}"#).expect("object should parse");
//! let bound = bind_arguments(&ToolSignature::positional_only(["x"]), args)
//!     .expect("single positional parameter should bind");
//!
//! assert_eq!(bound, ToolArguments::positional(vec![json!(5)]));
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ToolError, ToolSignature};

/// Arguments handed to [`crate::Tool::invoke`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    Named(Map<String, Value>),
    Positional(Vec<Value>),
}

impl Default for ToolArguments {
    fn default() -> Self {
        Self::Named(Map::new())
    }
}

impl ToolArguments {
    pub fn named(arguments: Map<String, Value>) -> Self {
        Self::Named(arguments)
    }

    pub fn positional(arguments: Vec<Value>) -> Self {
        Self::Positional(arguments)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Named(arguments) => arguments.len(),
            Self::Positional(arguments) => arguments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// Named lookup; always `None` for positional arguments.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Named(arguments) => arguments.get(key),
            Self::Positional(_) => None,
        }
    }

    /// Positional lookup; always `None` for named arguments.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Named(_) => None,
            Self::Positional(arguments) => arguments.get(index),
        }
    }

    /// The only argument, whichever way it was bound.
    pub fn single(&self) -> Option<&Value> {
        if self.len() != 1 {
            return None;
        }
        match self {
            Self::Named(arguments) => arguments.values().next(),
            Self::Positional(arguments) => arguments.first(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Named(arguments) => Value::Object(arguments.clone()),
            Self::Positional(arguments) => Value::Array(arguments.clone()),
        }
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(self.to_value())
            .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
    }

    /// Rebinds a single named argument by position.
    pub(crate) fn into_positional_single(self) -> Option<Self> {
        match self {
            Self::Named(arguments) if arguments.len() == 1 => {
                Some(Self::Positional(arguments.into_iter().map(|(_, v)| v).collect()))
            }
            _ => None,
        }
    }
}

/// Chooses how decoded call arguments reach a tool.
///
/// Opaque signatures always get named arguments. A declared signature without
/// keyword parameters and a single positional slot takes one argument by
/// position. Any other declared signature that accepts no keywords rejects the
/// call before invocation.
pub fn bind_arguments(
    signature: &ToolSignature,
    arguments: Map<String, Value>,
) -> Result<ToolArguments, ToolError> {
    if signature.is_opaque() || arguments.is_empty() || signature.accepts_keywords() {
        return Ok(ToolArguments::Named(arguments));
    }

    if signature.has_single_positional() && arguments.len() == 1 {
        return Ok(ToolArguments::Positional(
            arguments.into_iter().map(|(_, value)| value).collect(),
        ));
    }

    let names = arguments.keys().cloned().collect::<Vec<_>>().join(", ");
    Err(ToolError::keyword_arguments_rejected(format!(
        "tool takes no keyword arguments, got: {names}"
    )))
}

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(args_json)? {
        Value::Object(object) => Ok(object),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(arguments: &ToolArguments, key: &str) -> Result<String, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn required_number(arguments: &ToolArguments, key: &str) -> Result<f64, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required number: '{key}'")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::{Parameter, ParameterKind, ToolErrorKind};

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test value should be an object")
    }

    #[test]
    fn parse_object_and_extract_required_fields() {
        let args = ToolArguments::named(
            parse_json_object("{\"query\":\"rust\",\"limit\":3}").expect("args should parse"),
        );
        assert_eq!(required_string(&args, "query").expect("query"), "rust");
        assert_eq!(required_number(&args, "limit").expect("limit"), 3.0);

        let error = required_string(&args, "missing").expect_err("should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn parse_invalid_json_returns_invalid_arguments() {
        let error = parse_json_value("{").expect_err("json should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);

        let error = parse_json_object("[1]").expect_err("array is not an object");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn keyword_signatures_bind_by_name() {
        let bound = bind_arguments(&ToolSignature::keyword(["x", "y"]), object(json!({"x": 1, "y": 2})))
            .expect("should bind");
        assert!(bound.is_named());
        assert_eq!(bound.get("y"), Some(&json!(2)));

        let opaque = bind_arguments(&ToolSignature::Opaque, object(json!({"x": 1})))
            .expect("opaque should bind");
        assert!(opaque.is_named());
    }

    #[test]
    fn single_positional_parameter_binds_by_position() {
        let signature = ToolSignature::Declared(vec![
            Parameter::new("value", ParameterKind::PositionalOnly),
            Parameter::new("rest", ParameterKind::VarPositional),
        ]);
        let bound = bind_arguments(&signature, object(json!({"value": "a"}))).expect("should bind");
        assert_eq!(bound, ToolArguments::positional(vec![json!("a")]));
        assert_eq!(bound.at(0), Some(&json!("a")));
    }

    #[test]
    fn positional_only_signature_rejects_several_named_arguments() {
        let error = bind_arguments(
            &ToolSignature::positional_only(["a", "b"]),
            object(json!({"a": 1, "b": 2})),
        )
        .expect_err("should reject");
        assert_eq!(error.kind, ToolErrorKind::KeywordArgumentsRejected);
        assert!(error.message.contains("a, b"));
    }

    #[test]
    fn empty_arguments_bind_to_anything() {
        let bound = bind_arguments(&ToolSignature::positional_only(["a", "b"]), Map::new())
            .expect("no arguments should bind");
        assert!(bound.is_empty());
    }

    #[test]
    fn arguments_deserialize_into_typed_structs() {
        #[derive(Deserialize)]
        struct Add {
            a: i64,
            b: i64,
        }

        let args = ToolArguments::named(object(json!({"a": 2, "b": 3})));
        let add = args.deserialize::<Add>().expect("should deserialize");
        assert_eq!(add.a + add.b, 5);

        let single = ToolArguments::named(object(json!({"x": 5})));
        assert_eq!(single.single(), Some(&json!(5)));
        assert_eq!(
            single.into_positional_single(),
            Some(ToolArguments::positional(vec![json!(5)]))
        );
    }
}
