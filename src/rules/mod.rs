//! Built-in rule kinds.

mod file;
mod general;

pub use self::file::FileFilterRule;
pub use self::general::{IssueRule, MatchRule, PrintRule};

use crate::RuleType;

/// Every built-in rule type, in registration order.
#[must_use]
pub fn builtin_rule_types() -> Vec<RuleType> {
    vec![
        MatchRule::rule_type(),
        PrintRule::rule_type(),
        IssueRule::warning_type(),
        IssueRule::problem_type(),
        FileFilterRule::rule_type(),
    ]
}
