//! Localizable prompt strings loaded from TOML.
//!
//! Entries are either plain strings or tables carrying the text under `_`:
//!
//! ```rust
//! use tprotocol::StringTable;
//!
//! let table = StringTable::parse(
//!     r#"
//!     lang = "en"
//!     greeting = "Hello, {name}!"
//!
//!     [farewell]
//!     _ = "Goodbye."
//!     "#,
//! )
//! .expect("table should parse");
//!
//! assert_eq!(table.lang(), Some("en"));
//! assert_eq!(table.get("farewell"), Some("Goodbye."));
//! assert_eq!(
//!     table.render("greeting", &[("name", "Ada")]).expect("render"),
//!     "Hello, Ada!"
//! );
//! ```

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::ProtocolError;

const BUNDLED_LANGUAGE: &str = include_str!("../resource/language.toml");

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringTable {
    lang: Option<String>,
    entries: BTreeMap<String, String>,
}

impl StringTable {
    pub fn parse(source: &str) -> Result<Self, ProtocolError> {
        let table = toml::from_str::<Table>(source)
            .map_err(|err| ProtocolError::string_table(format!("invalid TOML: {err}")))?;

        let mut lang = None;
        let mut entries = BTreeMap::new();
        for (key, value) in table {
            match value {
                Value::String(text) if key == "lang" => lang = Some(text),
                Value::String(text) => {
                    entries.insert(key, text);
                }
                Value::Table(mut entry) => match entry.remove("_") {
                    Some(Value::String(text)) => {
                        entries.insert(key, text);
                    }
                    _ => {
                        return Err(ProtocolError::string_table(format!(
                            "entry '{key}' has no '_' text"
                        )));
                    }
                },
                other => {
                    return Err(ProtocolError::string_table(format!(
                        "entry '{key}' must be a string or table, got {}",
                        other.type_str()
                    )));
                }
            }
        }

        Ok(Self { lang, entries })
    }

    /// The English table shipped with the crate.
    pub fn bundled() -> Result<Self, ProtocolError> {
        Self::parse(BUNDLED_LANGUAGE)
    }

    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ProtocolError> {
        self.get(key)
            .ok_or_else(|| ProtocolError::string_table(format!("missing string '{key}'")))
    }

    /// Looks up `key` and substitutes each `{name}` placeholder found in `vars`.
    /// Placeholders without a value are left untouched. The template is scanned
    /// once, so substituted values are copied through verbatim.
    pub fn render(&self, key: &str, vars: &[(&str, &str)]) -> Result<String, ProtocolError> {
        let template = self.require(key)?;
        let mut text = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let substitution = after.find('}').and_then(|close| {
                let name = &after[..close];
                vars.iter()
                    .find(|(var, _)| *var == name)
                    .map(|(_, value)| (*value, close))
            });

            match substitution {
                Some((value, close)) => {
                    text.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    text.push('{');
                    rest = after;
                }
            }
        }
        text.push_str(rest);

        Ok(text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolErrorKind;

    #[test]
    fn bundled_table_has_prompt_strings() {
        let table = StringTable::bundled().expect("bundled table should parse");
        assert_eq!(table.lang(), Some("en"));
        for key in [
            "one_tool_prompt_leadin",
            "multi_tool_prompt_leadin",
            "tool_prompt_schemas",
            "tool_prompt_tail",
            "tool_results_leadin",
            "tool_result_line",
        ] {
            assert!(table.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn table_entry_without_text_is_rejected() {
        let error = StringTable::parse("[broken]\nnote = \"x\"").expect_err("should fail");
        assert_eq!(error.kind, ProtocolErrorKind::StringTable);
        assert!(error.message.contains("broken"));
    }

    #[test]
    fn non_string_entry_is_rejected() {
        let error = StringTable::parse("count = 3").expect_err("should fail");
        assert_eq!(error.kind, ProtocolErrorKind::StringTable);
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let table = StringTable::parse("line = \"{a} and {b}, {{b}}\"").expect("should parse");
        let text = table
            .render("line", &[("a", "x{b}"), ("b", "y")])
            .expect("render");
        assert_eq!(text, "x{b} and y, {y}");

        let text = table
            .render("line", &[("b", "{a}"), ("a", "z")])
            .expect("render");
        assert_eq!(text, "z and {a}, {{a}}");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let table = StringTable::parse("line = \"{a} and {b}\"").expect("should parse");
        let text = table.render("line", &[("a", "one")]).expect("render");
        assert_eq!(text, "one and {b}");

        let text = table.render("line", &[]).expect("render");
        assert_eq!(text, "{a} and {b}");

        let error = table.render("absent", &[]).expect_err("missing key");
        assert_eq!(error.kind, ProtocolErrorKind::StringTable);
    }
}
