use proptest::prelude::*;
use rulecheck::{RuleEngine, RuleSet};

/// A bare token: no whitespace, no leading quote, not starting with `--`.
pub fn arb_bare_token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.^$\\\\{}-][a-zA-Z0-9_.^$\\\\{}'-]{0,11}"
        .prop_filter("not a field marker", |s| !s.starts_with("--"))
}

/// A quoted token with arbitrary inner text, quotes and backslashes escaped.
/// Returns `(token, inner)` where `inner` is the text between the quotes.
pub fn arb_quoted_token() -> impl Strategy<Value = (String, String)> {
    "[a-z '\\\\ -]{0,12}".prop_map(|raw| {
        let mut inner = String::new();
        for c in raw.chars() {
            if c == '\'' || c == '\\' {
                inner.push('\\');
            }
            inner.push(c);
        }
        (format!("'{inner}'"), inner)
    })
}

/// Whitespace runs between tokens.
pub fn arb_gap() -> impl Strategy<Value = String> {
    "[ \t]{1,3}"
}

/// A message or path that survives the issue export format.
pub fn arb_export_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _./:\\[\\]-]{0,16}".prop_filter("no separator", |s| !s.contains("]: "))
}

/// Variable names usable inside `{...}`.
pub fn arb_var_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,7}"
}

/// Build an engine whose root set alternates a guard with a marker warning.
///
/// Guard `i` passes when `guards[i]` is true. Warning `i` records message `i`,
/// so the number of recorded warnings is the length of the passing prefix.
/// A child set adds one problem when every guard passed.
pub fn chain_engine(guards: &[bool]) -> RuleEngine {
    let mut engine = RuleEngine::with_builtins().unwrap();
    let mut set = RuleSet::new();
    for (i, pass) in guards.iter().enumerate() {
        let value = if *pass { "yes" } else { "no" };
        set.push(
            engine
                .parse(&format!("match --value {value} --pattern ^yes$"))
                .unwrap(),
        );
        set.push(
            engine
                .parse(&format!("warning --message {i} --path chain"))
                .unwrap(),
        );
    }
    engine.insert_ruleset(".", set.child("done"));
    engine.insert_ruleset(
        "done",
        RuleSet::new().with(engine.parse("problem --message done --path chain").unwrap()),
    );
    engine
}
