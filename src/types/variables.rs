use std::borrow::Cow;
use std::collections::HashMap;

/// Named string values shared by every rule of an engine.
///
/// Rules write variables as a side channel (for example the file name a
/// filter just matched) and later rules read them back through `{name}`
/// placeholders. The store lives as long as its engine and is never reset
/// between test runs.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable. `None` means the variable was never set, which is
    /// distinct from a variable set to the empty string.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set a variable; the last write wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{name}` placeholder in `template` with the current
    /// value of `name`.
    ///
    /// Unset variables substitute to the empty string. A `{` with no closing
    /// `}` after it is copied through unchanged.
    #[must_use]
    pub fn substitute<'t>(&self, template: &'t str) -> Cow<'t, str> {
        if !template.contains('{') {
            return Cow::Borrowed(template);
        }

        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            out.push_str(&rest[..open]);
            out.push_str(self.get(&after[..close]).unwrap_or_default());
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        Cow::Owned(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (k, v) in iter {
            vars.set(k, v);
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_distinct_from_empty() {
        let mut vars = Variables::new();
        assert_eq!(vars.get("x"), None);
        vars.set("x", "");
        assert_eq!(vars.get("x"), Some(""));
        assert!(vars.contains("x"));
    }

    #[test]
    fn last_write_wins() {
        let mut vars = Variables::new();
        vars.set("x", "1");
        vars.set("x", "2");
        assert_eq!(vars.get("x"), Some("2"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn substitute_known_variables() {
        let vars: Variables = [("name", "main.rs"), ("dir", "src")].into_iter().collect();
        assert_eq!(vars.substitute("{dir}/{name}"), "src/main.rs");
    }

    #[test]
    fn substitute_missing_variable_is_empty() {
        let vars = Variables::new();
        assert_eq!(vars.substitute("a{missing}b"), "ab");
        assert_eq!(vars.substitute("{missing}"), "");
    }

    #[test]
    fn substitute_without_placeholders_borrows() {
        let vars = Variables::new();
        assert!(matches!(vars.substitute("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn substitute_unclosed_brace_is_literal() {
        let vars: Variables = [("a", "1")].into_iter().collect();
        assert_eq!(vars.substitute("{a} {b"), "1 {b");
        assert_eq!(vars.substitute("x{"), "x{");
    }

    #[test]
    fn substitute_name_runs_to_first_closing_brace() {
        let vars: Variables = [("{a", "nested")].into_iter().collect();
        assert_eq!(vars.substitute("{{a}}"), "nested}");
    }

    #[test]
    fn substitute_does_not_rescan_values() {
        let vars: Variables = [("a", "{b}"), ("b", "2")].into_iter().collect();
        assert_eq!(vars.substitute("{a}"), "{b}");
    }
}
