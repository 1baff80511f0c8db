//! JSON configuration documents.
//!
//! A document names rule sets and seeds variables:
//!
//! ```json
//! {
//!     "variables": { "ext": "rs" },
//!     "rulesets": {
//!         ".": {
//!             "rules": ["file-filter --childrenfiles --then check-file"]
//!         },
//!         "check-file": {
//!             "enabled": true,
//!             "rules": ["match --value$ {file-name} --pattern \\.{ext}$"],
//!             "children": ["report"]
//!         }
//!     }
//! }
//! ```
//!
//! Loading is best effort. Only a document that is not a JSON object fails.
//! Entries of the wrong JSON type are skipped and recorded as
//! [`IgnoredEntry`], and a rule line that does not parse is dropped and
//! recorded as [`DroppedRule`]. The rest of the document still loads.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::parse::ParseError;
use crate::{RuleEngine, RuleSet, RulecheckError};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigDocument {
    pub variables: BTreeMap<String, String>,
    pub rulesets: BTreeMap<String, RuleSetConfig>,
    /// Entries skipped while reading because of their JSON type.
    #[serde(skip)]
    pub ignored: Vec<IgnoredEntry>,
}

/// One named rule set in a [`ConfigDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSetConfig {
    /// Disabled sets are skipped entirely and never registered.
    pub enabled: bool,
    /// Rule definition lines, in evaluation order.
    pub rules: Vec<String>,
    /// Child rule set names; an entry may hold several whitespace-separated
    /// names.
    pub children: Vec<String>,
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A document entry skipped because of its JSON type.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoredEntry {
    /// Dotted path to the entry, e.g. `rulesets.main.rules[2]`.
    pub location: String,
    pub value: Value,
}

impl IgnoredEntry {
    fn new(location: String, value: &Value) -> Self {
        Self {
            location,
            value: value.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_map(&map)),
            other => Err(D::Error::custom(format!(
                "expected a configuration object, found {}",
                json_type(&other)
            ))),
        }
    }
}

impl ConfigDocument {
    fn from_map(map: &Map<String, Value>) -> Self {
        let mut doc = Self::default();

        match map.get("variables") {
            None | Some(Value::Null) => {}
            Some(Value::Object(vars)) => {
                for (name, value) in vars {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        other => {
                            doc.ignored
                                .push(IgnoredEntry::new(format!("variables.{name}"), other));
                            continue;
                        }
                    };
                    doc.variables.insert(name.clone(), text);
                }
            }
            Some(other) => doc
                .ignored
                .push(IgnoredEntry::new("variables".to_owned(), other)),
        }

        match map.get("rulesets") {
            None | Some(Value::Null) => {}
            Some(Value::Object(sets)) => {
                for (name, value) in sets {
                    let set = RuleSetConfig::from_value(name, value, &mut doc.ignored);
                    doc.rulesets.insert(name.clone(), set);
                }
            }
            Some(other) => doc
                .ignored
                .push(IgnoredEntry::new("rulesets".to_owned(), other)),
        }

        doc
    }
}

impl RuleSetConfig {
    fn from_value(name: &str, value: &Value, ignored: &mut Vec<IgnoredEntry>) -> Self {
        let mut config = Self::default();
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return config,
            other => {
                ignored.push(IgnoredEntry::new(format!("rulesets.{name}"), other));
                return config;
            }
        };

        match map.get("enabled") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(enabled)) => config.enabled = *enabled,
            Some(other) => {
                ignored.push(IgnoredEntry::new(format!("rulesets.{name}.enabled"), other));
            }
        }

        config.rules = string_list(map.get("rules"), &format!("rulesets.{name}.rules"), ignored);
        config.children = string_list(
            map.get("children"),
            &format!("rulesets.{name}.children"),
            ignored,
        );
        config
    }
}

/// The string entries of a JSON array. Anything else is recorded in
/// `ignored`.
fn string_list(
    value: Option<&Value>,
    location: &str,
    ignored: &mut Vec<IgnoredEntry>,
) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    ignored.push(IgnoredEntry::new(format!("{location}[{i}]"), other));
                    None
                }
            })
            .collect(),
        // A lone string is a one-entry list.
        Some(Value::String(s)) => vec![s.clone()],
        Some(other) => {
            ignored.push(IgnoredEntry::new(location.to_owned(), other));
            Vec::new()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl ConfigDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the text is not valid JSON or its top
    /// level is not an object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`RulecheckError`] on I/O or JSON failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RulecheckError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }
}

impl FromStr for ConfigDocument {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

/// A rule line that was dropped while loading.
#[derive(Debug)]
pub struct DroppedRule {
    pub ruleset: String,
    pub line: String,
    pub error: ParseError,
}

/// What loading a document did.
#[derive(Debug, Default)]
#[must_use]
pub struct LoadReport {
    /// Rule sets registered, in load order.
    pub loaded: Vec<String>,
    /// Rule sets skipped because they were disabled.
    pub disabled: Vec<String>,
    /// Rule lines that failed to parse.
    pub dropped: Vec<DroppedRule>,
    /// Entries skipped because of their JSON type.
    pub ignored: Vec<IgnoredEntry>,
}

impl LoadReport {
    /// Nothing was dropped or ignored.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.ignored.is_empty()
    }
}

impl RuleEngine {
    /// Load a configuration document into the engine.
    ///
    /// Variables are applied first so rule lines of the same document can
    /// refer to them. Rule sets replace any already registered under the same
    /// name.
    pub fn load_document(&mut self, doc: &ConfigDocument) -> LoadReport {
        let mut report = LoadReport::default();

        for entry in &doc.ignored {
            warn!(location = %entry.location, value = %entry.value, "ignoring configuration entry");
            report.ignored.push(entry.clone());
        }

        for (name, value) in &doc.variables {
            self.set_variable(name.as_str(), value.as_str());
        }

        for (name, config) in &doc.rulesets {
            if !config.enabled {
                debug!(ruleset = %name, "skipping disabled rule set");
                report.disabled.push(name.clone());
                continue;
            }

            let mut set = RuleSet::new();
            for line in &config.rules {
                match self.parse(line) {
                    Ok(rule) => set.push(rule),
                    Err(error) => {
                        warn!(ruleset = %name, line = %line, error = %error, "dropping rule");
                        report.dropped.push(DroppedRule {
                            ruleset: name.clone(),
                            line: line.clone(),
                            error,
                        });
                    }
                }
            }
            for children in &config.children {
                set.add_children(children);
            }

            debug!(ruleset = %name, rules = set.len(), children = set.children().len(), "loaded rule set");
            self.insert_ruleset(name.clone(), set);
            report.loaded.push(name.clone());
        }

        report
    }

    /// Parse JSON text and load it.
    ///
    /// # Errors
    ///
    /// Returns [`RulecheckError::Config`] if the text is not JSON or not an
    /// object. Individual entries and rule lines never fail the load.
    pub fn load_json(&mut self, text: &str) -> Result<LoadReport, RulecheckError> {
        let doc = ConfigDocument::from_json(text)?;
        Ok(self.load_document(&doc))
    }

    /// Read a JSON file and load it.
    ///
    /// # Errors
    ///
    /// Returns [`RulecheckError`] on I/O or JSON failure.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, RulecheckError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let doc = ConfigDocument::from_file(path)?;
        Ok(self.load_document(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keys_are_optional() {
        let doc = ConfigDocument::from_json("{}").unwrap();
        assert_eq!(doc, ConfigDocument::default());

        let doc = ConfigDocument::from_json(r#"{"rulesets": {"a": {}}}"#).unwrap();
        assert_eq!(doc.rulesets["a"], RuleSetConfig::default());
        assert!(doc.rulesets["a"].enabled);
    }

    #[test]
    fn parses_full_document() {
        let doc: ConfigDocument = r#"{
            "variables": {"root": "src"},
            "rulesets": {
                "main": {
                    "enabled": false,
                    "rules": ["print --message hi"],
                    "children": ["a b", "c"]
                }
            }
        }"#
        .parse()
        .unwrap();

        assert_eq!(doc.variables["root"], "src");
        let main = &doc.rulesets["main"];
        assert!(!main.enabled);
        assert_eq!(main.rules, vec!["print --message hi"]);
        assert_eq!(main.children, vec!["a b", "c"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let doc = ConfigDocument::from_json(r#"{"version": 2, "rulesets": {}}"#).unwrap();
        assert!(doc.rulesets.is_empty());
    }

    #[test]
    fn only_a_non_object_document_is_an_error() {
        assert!(ConfigDocument::from_json("not json").is_err());
        assert!(ConfigDocument::from_json("[1, 2]").is_err());
        assert!(ConfigDocument::from_json("null").is_err());

        let doc = ConfigDocument::from_json(r#"{"rulesets": []}"#).unwrap();
        assert!(doc.rulesets.is_empty());
        assert_eq!(doc.ignored[0].location, "rulesets");
    }

    #[test]
    fn wrongly_typed_entries_are_skipped() {
        let doc = ConfigDocument::from_json(
            r#"{
                "variables": {"name": "x", "count": 3, "flag": true, "list": [1]},
                "rulesets": {
                    "main": {
                        "enabled": "yes",
                        "rules": ["print --message a", 5, "print --message b"],
                        "children": [null, "next"]
                    },
                    "bare": 7
                }
            }"#,
        )
        .unwrap();

        assert_eq!(doc.variables["name"], "x");
        assert_eq!(doc.variables["count"], "3");
        assert_eq!(doc.variables["flag"], "true");
        assert!(!doc.variables.contains_key("list"));

        let main = &doc.rulesets["main"];
        assert!(main.enabled);
        assert_eq!(main.rules, vec!["print --message a", "print --message b"]);
        assert_eq!(main.children, vec!["next"]);
        assert_eq!(doc.rulesets["bare"], RuleSetConfig::default());

        let locations: Vec<_> = doc.ignored.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(
            locations,
            vec![
                "variables.list",
                "rulesets.bare",
                "rulesets.main.enabled",
                "rulesets.main.rules[1]",
                "rulesets.main.children[0]",
            ]
        );
        assert_eq!(doc.ignored[3].value, Value::from(5));
    }

    #[test]
    fn single_string_is_a_one_entry_list() {
        let doc =
            ConfigDocument::from_json(r#"{"rulesets": {"a": {"rules": "print", "children": "b c"}}}"#)
                .unwrap();
        assert_eq!(doc.rulesets["a"].rules, vec!["print"]);
        assert_eq!(doc.rulesets["a"].children, vec!["b c"]);
        assert!(doc.ignored.is_empty());
    }
}
