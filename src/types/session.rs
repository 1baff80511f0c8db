use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::trace;

use super::error::IssueLineError;
use super::issue::{Issue, IssueKind, IssueLine};
use super::ruleset::RuleSet;
use super::variables::Variables;

/// The outcome of one test run: issues grouped by key plus running counts.
///
/// Groups keep the order in which their key was first used; issues keep
/// insertion order within a group.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RuleTest {
    groups: HashMap<String, Vec<Issue>>,
    keys: Vec<String>,
    warning_count: usize,
    problem_count: usize,
}

impl RuleTest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue under `key`.
    pub fn add_issue(&mut self, key: impl Into<String>, issue: Issue) {
        match issue.kind() {
            IssueKind::Warning => self.warning_count += 1,
            IssueKind::Problem => self.problem_count += 1,
        }

        let key = key.into();
        if let Some(group) = self.groups.get_mut(&key) {
            group.push(issue);
        } else {
            self.keys.push(key.clone());
            self.groups.insert(key, vec![issue]);
        }
    }

    /// Record an issue under the empty key.
    pub fn add(&mut self, issue: Issue) {
        self.add_issue("", issue);
    }

    /// All issues, group by group.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.keys
            .iter()
            .filter_map(|key| self.groups.get(key))
            .flatten()
    }

    /// Issues recorded under `key`, empty if the key was never used.
    #[must_use]
    pub fn issues_for(&self, key: &str) -> &[Issue] {
        self.groups.get(key).map_or(&[], Vec::as_slice)
    }

    /// Group keys in first-use order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.warning_count + self.problem_count
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.problem_count
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// Render every issue as `[{path}]: {message}`, one per line.
    #[must_use]
    pub fn export(&self) -> String {
        let mut out = String::new();
        for issue in self.issues() {
            out.push_str(&issue.to_string());
            out.push('\n');
        }
        out
    }

    /// Write [`export`](Self::export) to a file.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from writing the file.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.export())
    }

    /// Parse text produced by [`export`](Self::export). Blank lines are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IssueLineError`] for the first line that is not in the
    /// export format.
    pub fn read_export(text: &str) -> Result<Vec<IssueLine>, IssueLineError> {
        text.lines()
            .filter(|line| !line.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for RuleTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Issues: {} (Warnings: {}, Problems: {})",
            self.issue_count(),
            self.warning_count,
            self.problem_count
        )
    }
}

/// The view of the engine a [`Rule`](super::Rule) gets while it is tested.
///
/// A session lives for one test run. It reads and writes the engine's
/// variables, resolves rule sets by name, and accumulates issues into the
/// run's [`RuleTest`].
pub struct Session<'a> {
    rulesets: &'a HashMap<String, RuleSet>,
    variables: &'a mut Variables,
    report: RuleTest,
}

impl<'a> Session<'a> {
    pub fn new(rulesets: &'a HashMap<String, RuleSet>, variables: &'a mut Variables) -> Self {
        Self {
            rulesets,
            variables,
            report: RuleTest::new(),
        }
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.set(name, value);
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        self.variables
    }

    #[must_use]
    pub fn ruleset(&self, name: &str) -> Option<&'a RuleSet> {
        self.rulesets.get(name)
    }

    pub fn add_issue(&mut self, key: impl Into<String>, issue: Issue) {
        self.report.add_issue(key, issue);
    }

    pub fn report(&self) -> &RuleTest {
        &self.report
    }

    /// Evaluate each whitespace-separated rule set name in `targets` against
    /// `input`, in order. Unknown names are skipped.
    pub fn call(&mut self, targets: &str, input: &dyn Any) {
        for name in targets.split_whitespace() {
            match self.ruleset(name) {
                Some(set) => {
                    trace!(ruleset = name, "calling rule set");
                    set.test(self, input);
                }
                None => trace!(ruleset = name, "skipping unknown rule set"),
            }
        }
    }

    pub fn into_report(self) -> RuleTest {
        self.report
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("rulesets", &self.rulesets.len())
            .field("variables", &self.variables.len())
            .field("report", &self.report)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_kind() {
        let mut test = RuleTest::new();
        test.add_issue("style", Issue::warning("w", "a"));
        test.add_issue("style", Issue::problem("p", "b"));
        assert_eq!(test.issue_count(), 2);
        assert_eq!(test.warning_count(), 1);
        assert_eq!(test.problem_count(), 1);
        assert_eq!(test.issues_for("style").len(), 2);
    }

    #[test]
    fn groups_keep_first_use_order() {
        let mut test = RuleTest::new();
        test.add_issue("b", Issue::warning("1", "x"));
        test.add_issue("a", Issue::warning("2", "x"));
        test.add_issue("b", Issue::warning("3", "x"));
        test.add(Issue::problem("4", "x"));

        let messages: Vec<_> = test.issues().map(Issue::message).collect();
        assert_eq!(messages, vec!["1", "3", "2", "4"]);
        assert_eq!(test.keys().collect::<Vec<_>>(), vec!["b", "a", ""]);
    }

    #[test]
    fn unknown_key_is_empty() {
        let test = RuleTest::new();
        assert!(test.issues_for("missing").is_empty());
        assert!(test.is_clean());
    }

    #[test]
    fn export_and_read_back() {
        let mut test = RuleTest::new();
        test.add(Issue::warning("first", "src/a.rs"));
        test.add(Issue::problem("second: detail", "src/b.rs"));

        let text = test.export();
        assert_eq!(text, "[src/a.rs]: first\n[src/b.rs]: second: detail\n");

        let lines = RuleTest::read_export(&text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].path, "src/b.rs");
        assert_eq!(lines[1].message, "second: detail");
    }

    #[test]
    fn read_export_stops_at_malformed_line() {
        let err = RuleTest::read_export("[a]: fine\n\n[b] broken\n").unwrap_err();
        assert_eq!(
            err,
            IssueLineError::MissingSeparator {
                line: "[b] broken".into()
            }
        );
    }

    #[test]
    fn display_summary() {
        let mut test = RuleTest::new();
        test.add(Issue::warning("w", "p"));
        assert_eq!(test.to_string(), "Issues: 1 (Warnings: 1, Problems: 0)");
    }

    #[test]
    fn session_reads_and_writes_variables() {
        let rulesets = HashMap::new();
        let mut vars = Variables::new();
        vars.set("seed", "1");

        let mut session = Session::new(&rulesets, &mut vars);
        assert_eq!(session.variable("seed"), Some("1"));
        session.set_variable("seed", "2");
        session.add_issue("k", Issue::warning("m", "p"));
        session.call("missing other", &());
        let report = session.into_report();

        assert_eq!(report.issue_count(), 1);
        assert_eq!(vars.get("seed"), Some("2"));
    }
}
