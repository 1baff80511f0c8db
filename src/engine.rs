use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::parse::{ParseError, parse_rule};
use crate::{
    CompileError, ParsedRule, RegistryError, RuleRegistry, RuleSet, RuleTest, RuleType, Session,
    Variables,
};

/// Name of the rule set a test starts from when no root is given.
pub const DEFAULT_ROOT: &str = ".";

/// Owns the rule types, the named rule sets and the variables, and runs
/// tests over them.
///
/// # Example
///
/// ```
/// use rulecheck::{RuleEngine, RuleSet};
///
/// let mut engine = RuleEngine::with_builtins().unwrap();
/// engine.set_variable("file", "notes.txt");
///
/// let rule = engine
///     .parse("warning --message$ 'unexpected {file}' --path$ {file}")
///     .unwrap();
/// engine.insert_ruleset(".", RuleSet::new().with(rule));
///
/// let report = engine.test_default(&());
/// assert_eq!(report.warning_count(), 1);
/// assert_eq!(report.export(), "[notes.txt]: unexpected notes.txt\n");
/// ```
#[derive(Debug, Default)]
pub struct RuleEngine {
    registry: RuleRegistry,
    rulesets: HashMap<String, RuleSet>,
    variables: Variables,
}

impl RuleEngine {
    /// An engine with no rule types registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with every built-in rule type registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a built-in kind fails validation.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        Ok(Self::with_registry(RuleRegistry::with_builtins()?))
    }

    #[must_use]
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    // -- rule sets --

    /// Register a rule set, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, set: RuleSet) -> Self {
        self.insert_ruleset(name, set);
        self
    }

    /// Register a rule set, returning the one it replaced.
    pub fn insert_ruleset(&mut self, name: impl Into<String>, set: RuleSet) -> Option<RuleSet> {
        self.rulesets.insert(name.into(), set)
    }

    pub fn remove_ruleset(&mut self, name: &str) -> Option<RuleSet> {
        self.rulesets.remove(name)
    }

    #[must_use]
    pub fn ruleset(&self, name: &str) -> Option<&RuleSet> {
        self.rulesets.get(name)
    }

    /// Registered rule set names, sorted.
    #[must_use]
    pub fn ruleset_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rulesets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // -- rule types --

    /// Register a rule kind. A kind with the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidKind`] if the kind's name or fields
    /// are unusable.
    pub fn register_rule_type(&mut self, rule_type: RuleType) -> Result<(), RegistryError> {
        self.registry.register(rule_type)
    }

    /// Register every built-in rule kind.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a built-in kind fails validation.
    pub fn load_rule_types(&mut self) -> Result<(), RegistryError> {
        self.registry.discover_all()
    }

    #[must_use]
    pub fn rule_type(&self, name: &str) -> Option<&RuleType> {
        self.registry.get(name).map(|t| &**t)
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Documentation for every registered kind.
    #[must_use]
    pub fn export_documentation(&self) -> String {
        self.registry.export_documentation()
    }

    /// Write [`export_documentation`](Self::export_documentation) to a file.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from writing the file.
    pub fn export_rule_types(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.export_documentation())
    }

    // -- variables --

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.set(name, value);
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name)
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    // -- parsing and testing --

    /// Parse a rule line against the registered kinds and current variables.
    ///
    /// # Errors
    ///
    /// See [`parse_rule`].
    pub fn parse(&self, line: &str) -> Result<ParsedRule, ParseError> {
        parse_rule(line, &self.registry, &self.variables)
    }

    /// Evaluate the rule set named `root` against `input`.
    ///
    /// Every call starts a fresh report. An unknown root yields an empty
    /// report. Variables written by rules during the test stay set
    /// afterwards.
    pub fn test(&mut self, input: &dyn Any, root: &str) -> RuleTest {
        let mut session = Session::new(&self.rulesets, &mut self.variables);

        match session.ruleset(root) {
            Some(set) => {
                debug!(root, rules = set.len(), "starting test");
                set.test(&mut session, input);
            }
            None => debug!(root, "root rule set not found"),
        }

        let report = session.into_report();
        debug!(
            root,
            warnings = report.warning_count(),
            problems = report.problem_count(),
            "test finished"
        );
        report
    }

    /// [`test`](Self::test) from [`DEFAULT_ROOT`].
    pub fn test_default(&mut self, input: &dyn Any) -> RuleTest {
        self.test(input, DEFAULT_ROOT)
    }

    /// Check that no rule set reaches itself through its children.
    ///
    /// Evaluation never runs this check; a cyclic table recurses until the
    /// stack overflows.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::CyclicRuleSet`] with the first cycle found.
    pub fn check_cycles(&self) -> Result<(), CompileError> {
        crate::compile::check_cycles(&self.rulesets)
    }
}
