use thiserror::Error;

/// Errors produced when registering a rule type.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid rule type '{name}': {reason}")]
    InvalidKind { name: String, reason: String },
}

/// Errors produced by static validation of the rule set table.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cyclic rule set reference detected: {}", path.join(" -> "))]
    CyclicRuleSet { path: Vec<String> },
}

/// Errors produced when reading a line of an issue export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueLineError {
    #[error("issue line must start with '[': {line}")]
    MissingBracket { line: String },

    #[error("issue line is missing ']: ': {line}")]
    MissingSeparator { line: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_kind_message() {
        let err = RegistryError::InvalidKind {
            name: "--match".into(),
            reason: "name must not start with '--'".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid rule type '--match': name must not start with '--'"
        );
    }

    #[test]
    fn cyclic_rule_set_message() {
        let err = CompileError::CyclicRuleSet {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "cyclic rule set reference detected: a -> b -> a"
        );
    }

    #[test]
    fn issue_line_messages_quote_the_line() {
        let err = IssueLineError::MissingSeparator {
            line: "[a] b".into(),
        };
        assert_eq!(err.to_string(), "issue line is missing ']: ': [a] b");
    }
}
