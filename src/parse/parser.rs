use std::sync::Arc;

use tracing::trace;

use super::{ParseError, tokenize};
use crate::{ParsedRule, RuleRegistry, Variables};

/// Value of a field written as a bare flag (`--inverse`).
const FLAG_VALUE: &str = "true";

/// Parse one rule definition line into a configured rule.
///
/// The first token names the rule type. Every `--field` token starts an
/// assignment whose value is the following tokens up to the next `--`,
/// joined with single spaces. A trailing `$` on the field name marks it
/// dynamic: its raw value is kept and re-substituted before every test.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] for a blank line,
/// [`ParseError::UnknownRuleType`] if the type is not registered and
/// [`ParseError::FieldCoercion`] if a value does not convert to its field's
/// kind.
pub fn parse_rule(
    line: &str,
    registry: &RuleRegistry,
    variables: &Variables,
) -> Result<ParsedRule, ParseError> {
    let tokens = tokenize(line)?;
    let Some((&type_name, args)) = tokens.split_first() else {
        return Err(ParseError::Empty);
    };

    let kind = registry
        .get(type_name)
        .ok_or_else(|| ParseError::UnknownRuleType {
            name: type_name.to_owned(),
        })?;

    let mut rule = ParsedRule::new(Arc::clone(kind));
    let mut i = 0;

    while i < args.len() {
        let Some(name) = args[i].strip_prefix("--") else {
            trace!(token = args[i], "ignoring stray token");
            i += 1;
            continue;
        };
        i += 1;

        let (field, dynamic) = match name.strip_suffix('$') {
            Some(field) => (field, true),
            None => (name, false),
        };

        let start = i;
        while i < args.len() && !args[i].starts_with("--") {
            i += 1;
        }
        let joined = if start == i {
            FLAG_VALUE.to_owned()
        } else {
            args[start..i].join(" ")
        };
        let raw = strip_quotes(&joined);

        if dynamic {
            rule.set_dynamic_value(field, raw);
        }

        let value = variables.substitute(raw);
        rule.set_field(field, &value)?;
    }

    Ok(rule)
}

/// Drop one leading and one trailing character from a value that starts
/// with a quote.
fn strip_quotes(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix('\'') else {
        return raw;
    };
    let mut chars = inner.chars();
    chars.next_back();
    chars.as_str()
}
