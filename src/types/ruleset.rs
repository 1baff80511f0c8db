use std::any::Any;
use std::fmt;

use tracing::trace;

use super::rule::ParsedRule;
use super::session::Session;

/// An ordered chain of rules guarding a cascade into child rule sets.
///
/// Rules run in declaration order and the first one returning `false` stops
/// the set. Only when every rule passed (trivially so for a set without
/// rules) are the children evaluated, in order, against the same input.
/// Children are names, resolved through the session when the set runs, so
/// they may refer to sets registered later.
///
/// # Example
///
/// ```
/// use rulecheck::{RuleEngine, RuleSet};
///
/// let mut engine = RuleEngine::with_builtins().unwrap();
/// let guard = engine.parse("match --value '{ext}' --pattern ^rs$").unwrap();
/// let set = RuleSet::new().with(guard).child("rust-checks");
/// engine.insert_ruleset("by-extension", set);
///
/// assert_eq!(engine.ruleset("by-extension").unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<ParsedRule>,
    children: Vec<String>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    #[must_use]
    pub fn with(mut self, rule: ParsedRule) -> Self {
        self.push(rule);
        self
    }

    /// Append a child reference. `names` may hold several names separated by
    /// whitespace.
    #[must_use]
    pub fn child(mut self, names: &str) -> Self {
        self.add_children(names);
        self
    }

    pub fn push(&mut self, rule: ParsedRule) {
        self.rules.push(rule);
    }

    pub fn add_children(&mut self, names: &str) {
        self.children
            .extend(names.split_whitespace().map(str::to_owned));
    }

    #[must_use]
    pub fn rules(&self) -> &[ParsedRule] {
        &self.rules
    }

    #[must_use]
    pub fn children(&self) -> &[String] {
        &self.children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the set against `input`.
    pub fn test(&self, session: &mut Session<'_>, input: &dyn Any) {
        for (i, rule) in self.rules.iter().enumerate() {
            if !rule.test(session, input) {
                trace!(rule = i, rule_type = rule.type_name(), "rule stopped the set");
                return;
            }
        }

        for name in &self.children {
            match session.ruleset(name) {
                Some(child) => child.test(session, input),
                None => trace!(ruleset = %name, "skipping unknown child"),
            }
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules, {} children)",
            self.rules.len(),
            self.children.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_split_on_whitespace() {
        let set = RuleSet::new().child("a b").child("  c ");
        assert_eq!(set.children(), &["a", "b", "c"]);
    }

    #[test]
    fn empty_set() {
        let set = RuleSet::new();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "RuleSet(0 rules, 0 children)");
    }
}
