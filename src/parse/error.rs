use thiserror::Error;

use crate::FieldKind;

/// Errors produced when parsing a single rule definition line.
///
/// All of these are local to the line: the configuration loader drops the
/// line and carries on with the next one.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error: empty rule definition")]
    Empty,

    #[error("parse error: {message}")]
    Malformed { message: String },

    #[error("parse error: unknown rule type '{name}'")]
    UnknownRuleType { name: String },

    #[error("parse error: cannot convert '{value}' to {kind} for field '{field}'")]
    FieldCoercion {
        field: String,
        value: String,
        kind: FieldKind,
    },
}

impl ParseError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_type_display() {
        let err = ParseError::UnknownRuleType {
            name: "mtach".into(),
        };
        assert_eq!(err.to_string(), "parse error: unknown rule type 'mtach'");
    }

    #[test]
    fn field_coercion_display() {
        let err = ParseError::FieldCoercion {
            field: "depth".into(),
            value: "deep".into(),
            kind: FieldKind::Int,
        };
        assert_eq!(
            err.to_string(),
            "parse error: cannot convert 'deep' to integer for field 'depth'"
        );
    }

    #[test]
    fn malformed_display() {
        let err = ParseError::malformed("unexpected token");
        assert_eq!(err.to_string(), "parse error: unexpected token");
    }
}
