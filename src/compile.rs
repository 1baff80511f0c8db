use std::collections::HashMap;

use crate::{CompileError, RuleSet};

/// Check that no rule set reaches itself through `children` references.
///
/// Unknown child names are ignored, as they are during evaluation. Names are
/// visited in sorted order so the reported cycle is deterministic.
pub(crate) fn check_cycles(rulesets: &HashMap<String, RuleSet>) -> Result<(), CompileError> {
    let adj: HashMap<&str, Vec<&str>> = rulesets
        .iter()
        .map(|(name, set)| {
            let children = set
                .children()
                .iter()
                .map(String::as_str)
                .filter(|child| rulesets.contains_key(*child))
                .collect();
            (name.as_str(), children)
        })
        .collect();

    let mut names: Vec<&str> = adj.keys().copied().collect();
    names.sort_unstable();

    let mut state: HashMap<&str, DfsState> =
        names.iter().map(|&n| (n, DfsState::Unvisited)).collect();
    let mut stack: Vec<&str> = Vec::new();

    for name in names {
        if state.get(name) == Some(&DfsState::Unvisited)
            && let Some(path) = dfs(name, &adj, &mut state, &mut stack)
        {
            return Err(CompileError::CyclicRuleSet { path });
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Unvisited,
    InStack,
    Done,
}

fn dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, DfsState>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    state.insert(node, DfsState::InStack);
    stack.push(node);

    if let Some(neighbors) = adj.get(node) {
        for &neighbor in neighbors {
            match state.get(neighbor) {
                Some(DfsState::InStack) => {
                    let pos = stack.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[pos..].iter().map(|&s| s.to_owned()).collect();
                    cycle.push(neighbor.to_owned());
                    return Some(cycle);
                }
                Some(DfsState::Unvisited) | None => {
                    if let Some(cycle) = dfs(neighbor, adj, state, stack) {
                        return Some(cycle);
                    }
                }
                Some(DfsState::Done) => {}
            }
        }
    }

    stack.pop();
    state.insert(node, DfsState::Done);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(edges: &[(&str, &str)]) -> HashMap<String, RuleSet> {
        let mut sets: HashMap<String, RuleSet> = HashMap::new();
        for &(name, children) in edges {
            sets.insert(name.to_owned(), RuleSet::new().child(children));
        }
        sets
    }

    #[test]
    fn acyclic_table_passes() {
        let sets = table(&[("root", "a b"), ("a", "c"), ("b", "c"), ("c", "")]);
        assert!(check_cycles(&sets).is_ok());
    }

    #[test]
    fn unknown_children_are_ignored() {
        let sets = table(&[("root", "missing also-missing")]);
        assert!(check_cycles(&sets).is_ok());
    }

    #[test]
    fn two_node_cycle() {
        let sets = table(&[("a", "b"), ("b", "a")]);
        match check_cycles(&sets) {
            Err(CompileError::CyclicRuleSet { path }) => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected CyclicRuleSet, got {other:?}"),
        }
    }

    #[test]
    fn self_reference() {
        let sets = table(&[("loop", "loop")]);
        match check_cycles(&sets) {
            Err(CompileError::CyclicRuleSet { path }) => {
                assert_eq!(path, vec!["loop", "loop"]);
            }
            other => panic!("expected CyclicRuleSet, got {other:?}"),
        }
    }

    #[test]
    fn three_node_cycle_reached_from_root() {
        let sets = table(&[("0-root", "x"), ("x", "y"), ("y", "z"), ("z", "x")]);
        match check_cycles(&sets) {
            Err(CompileError::CyclicRuleSet { path }) => {
                assert_eq!(path.first(), path.last());
                assert_eq!(path, vec!["x", "y", "z", "x"]);
            }
            other => panic!("expected CyclicRuleSet, got {other:?}"),
        }
    }
}
