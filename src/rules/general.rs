//! General purpose rule kinds: pattern guards, console output and issue
//! recording.

use std::any::Any;

use regex::Regex;
use tracing::{info, warn};

use crate::{Field, Issue, IssueKind, Rule, RuleType, Session};

/// `match`: stops the rule set unless `value` matches the regex `pattern`.
#[derive(Debug, Clone, Default)]
pub struct MatchRule {
    pub value: Option<String>,
    pub pattern: Option<String>,
    pub inverse: bool,
}

impl MatchRule {
    #[must_use]
    pub fn rule_type() -> RuleType {
        RuleType::builder::<MatchRule>("match")
            .description("Stops a ruleset execution if the value does not match the pattern")
            .field(
                Field::new("value", "Defines the value to be checked").required(),
                |r: &mut MatchRule, v| r.value = v,
            )
            .field(
                Field::new("pattern", "Defines the Regex pattern").required(),
                |r: &mut MatchRule, v| r.pattern = v,
            )
            .field(
                Field::new("inverse", "Defines if the result will be inverted").default_value(false),
                |r: &mut MatchRule, v| r.inverse = v,
            )
            .build()
    }
}

impl Rule for MatchRule {
    fn test(&self, _session: &mut Session<'_>, _input: &dyn Any) -> bool {
        let (Some(value), Some(pattern)) = (&self.value, &self.pattern) else {
            return false;
        };

        match Regex::new(pattern) {
            Ok(re) => re.is_match(value) != self.inverse,
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "invalid match pattern");
                false
            }
        }
    }
}

/// `print`: writes `message` to stdout and carries on.
#[derive(Debug, Clone, Default)]
pub struct PrintRule {
    pub message: Option<String>,
}

impl PrintRule {
    #[must_use]
    pub fn rule_type() -> RuleType {
        RuleType::builder::<PrintRule>("print")
            .description("Print a message to console")
            .field(
                Field::new("message", "Defines the message to be printed"),
                |r: &mut PrintRule, v| r.message = v,
            )
            .build()
    }
}

impl Rule for PrintRule {
    fn test(&self, _session: &mut Session<'_>, _input: &dyn Any) -> bool {
        let message = self.message.as_deref().unwrap_or_default();
        info!(message, "print");
        println!("{message}");
        true
    }
}

/// `warning` / `problem`: records an issue under `key` when both `message`
/// and `path` are set. Never stops the rule set.
#[derive(Debug, Clone)]
pub struct IssueRule {
    pub kind: IssueKind,
    pub key: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
}

impl IssueRule {
    #[must_use]
    pub fn new(kind: IssueKind) -> Self {
        Self {
            kind,
            key: None,
            message: None,
            path: None,
        }
    }

    #[must_use]
    pub fn warning_type() -> RuleType {
        Self::rule_type(
            RuleType::with_factory("warning", || IssueRule::new(IssueKind::Warning))
                .description("Marks a warning issue"),
        )
    }

    #[must_use]
    pub fn problem_type() -> RuleType {
        Self::rule_type(
            RuleType::with_factory("problem", || IssueRule::new(IssueKind::Problem))
                .description("Marks a problem issue"),
        )
    }

    fn rule_type(builder: crate::RuleTypeBuilder<IssueRule>) -> RuleType {
        builder
            .field(
                Field::new("key", "Defines the issue sorting key").required(),
                |r: &mut IssueRule, v| r.key = v,
            )
            .field(
                Field::new("message", "Defines the message to be shown").required(),
                |r: &mut IssueRule, v| r.message = v,
            )
            .field(
                Field::new("path", "Defines the navigation path").required(),
                |r: &mut IssueRule, v| r.path = v,
            )
            .build()
    }
}

impl Rule for IssueRule {
    fn test(&self, session: &mut Session<'_>, _input: &dyn Any) -> bool {
        if let (Some(message), Some(path)) = (&self.message, &self.path) {
            let key = self.key.clone().unwrap_or_default();
            session.add_issue(key, Issue::new(self.kind, message.clone(), path.clone()));
        }
        true
    }
}
