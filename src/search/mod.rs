/*
    This module decides whether a string belongs to a grammar's language by
    searching breadth-first over leftmost derivations
*/

mod analysis;
mod strategy;

use std::collections::HashSet;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classifier::GrammarClass;
use crate::config::SearchConfig;
use crate::grammar::*;

pub use analysis::YieldTable;
pub use strategy::{Pruner, Strategy};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SearchError {
    // The caller's cancellation flag was raised between two levels
    Cancelled { depth: usize },
}

impl Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Cancelled { depth } => write!(f, "Search cancelled after exploring {} levels", depth),
        }
    }
}

impl std::error::Error for SearchError {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchStats {
    pub states_explored: usize,
    // None when the grammar's search space is finite and no bound was needed
    pub step_bound: Option<usize>,
    pub deepest_level: usize,
    // Some form still had nonterminals when the step bound was reached
    pub depth_limit_hit: bool,
    // The state budget ran out before the search did
    pub state_limit_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub derivation: Option<Derivation>,
    pub strategy: Strategy,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn belongs(&self) -> bool {
        self.derivation.is_some()
    }

    // A rejection that came from running into a limit rather than from
    // running out of forms to try
    pub fn truncated(&self) -> bool {
        !self.belongs() && (self.stats.depth_limit_hit || self.stats.state_limit_hit)
    }
}

// A sentential form in the search arena, linked back to the form it was
// rewritten from
struct Node {
    form: SententialForm,
    parent: Option<usize>,
    production: usize,
    position: usize,
}

fn rewrite(form: &[Symbol], position: usize, rhs: &[Symbol]) -> SententialForm {
    let mut rewritten = Vec::with_capacity(form.len() + rhs.len());
    rewritten.extend_from_slice(&form[..position]);
    rewritten.extend_from_slice(rhs);
    rewritten.extend_from_slice(&form[position + 1..]);
    rewritten
}

fn is_goal(form: &[Symbol], target: &[char]) -> bool {
    form.len() == target.len() && form.iter().zip(target).all(|(symbol, &c)| *symbol == Symbol::Terminal(c))
}

fn trace_back(arena: &[Node], goal: usize, start_symbol: char) -> Derivation {
    let mut steps = Vec::new();
    let mut current = goal;
    while let Some(parent) = arena[current].parent {
        let node = &arena[current];
        steps.push(DerivationStep {
            form: node.form.clone(),
            production: node.production,
            position: node.position,
        });
        current = parent;
    }
    steps.reverse();

    Derivation { start_symbol, steps }
}

/// Searches breadth-first for the shortest leftmost derivation of `input`,
/// trying productions in declaration order. Derivations longer than
/// [`SearchConfig::step_bound`] are skipped unless no nonterminal can vanish.
pub fn search(grammar: &Grammar, class: GrammarClass, input: &str, config: &SearchConfig) -> SearchOutcome {
    explore(grammar, class, input, config, None).0
}

/// Same as [`search`], but gives up with [`SearchError::Cancelled`] once
/// `cancel` is set. The flag is checked once per level.
pub fn search_cancellable(
    grammar: &Grammar,
    class: GrammarClass,
    input: &str,
    config: &SearchConfig,
    cancel: &AtomicBool,
) -> Result<SearchOutcome, SearchError> {
    match explore(grammar, class, input, config, Some(cancel)) {
        (outcome, false) => Ok(outcome),
        (outcome, true) => Err(SearchError::Cancelled { depth: outcome.stats.deepest_level }),
    }
}

fn explore(
    grammar: &Grammar,
    class: GrammarClass,
    input: &str,
    config: &SearchConfig,
    cancel: Option<&AtomicBool>,
) -> (SearchOutcome, bool) {
    let target: Vec<char> = input.chars().collect();
    let strategy = Strategy::for_grammar(grammar, class);
    let yields = YieldTable::new(grammar);
    let pruner = Pruner::new(strategy, &target, &yields);

    let exact = config.exact_when_epsilon_free && !yields.has_nullable();
    let step_bound = (!exact).then(|| config.step_bound(target.len(), grammar.productions.len()));

    let mut stats = SearchStats { step_bound, ..Default::default() };
    let start = grammar.start_form();
    let mut visited = HashSet::from([start.clone()]);
    let mut arena = vec![Node { form: start, parent: None, production: 0, position: 0 }];
    let mut frontier = vec![0];
    let mut depth = 0;

    tracing::debug!(%strategy, ?step_bound, input, "starting derivation search");

    while !frontier.is_empty() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            tracing::debug!(depth, "derivation search cancelled");
            let outcome = SearchOutcome { derivation: None, strategy, stats };
            return (outcome, true);
        }

        stats.deepest_level = depth;
        tracing::debug!(depth, frontier = frontier.len(), stored = arena.len(), "searching level");

        let mut next = Vec::new();
        for &index in &frontier {
            stats.states_explored += 1;

            let form = &arena[index].form;
            let Some(position) = form.iter().position(Symbol::is_nonterminal) else {
                if is_goal(form, &target) {
                    let derivation = trace_back(&arena, index, grammar.start_symbol);
                    tracing::debug!(steps = derivation.len(), explored = stats.states_explored, "derivation found");
                    let outcome = SearchOutcome { derivation: Some(derivation), strategy, stats };
                    return (outcome, false);
                }
                continue;
            };

            if step_bound.is_some_and(|bound| depth >= bound) {
                stats.depth_limit_hit = true;
                continue;
            }
            // Out of room: keep checking what is already stored, add nothing
            if stats.state_limit_hit {
                continue;
            }

            let successors: Vec<_> = grammar.productions_for(form[position].as_char())
                .map(|(production, rule)| (production, rewrite(form, position, &rule.rhs)))
                .filter(|(_, successor)| pruner.admits(successor) && !visited.contains(successor))
                .collect();

            for (production, successor) in successors {
                // A form can be produced twice within one batch
                if !visited.insert(successor.clone()) {
                    continue;
                }
                if arena.len() >= config.max_states {
                    stats.state_limit_hit = true;
                    tracing::warn!(max_states = config.max_states, depth, "derivation search ran out of state budget");
                    break;
                }
                arena.push(Node { form: successor, parent: Some(index), production, position });
                next.push(arena.len() - 1);
            }
        }

        frontier = next;
        depth += 1;
    }

    tracing::debug!(explored = stats.states_explored, "no derivation found");
    (SearchOutcome { derivation: None, strategy, stats }, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::parser::parse_grammar;

    fn grammar(productions: &str) -> Grammar {
        parse_grammar(&format!("S = S\nP = {{\n{}\n}}", productions)).unwrap()
    }

    fn run(grammar: &Grammar, input: &str) -> SearchOutcome {
        search(grammar, classify(grammar), input, &SearchConfig::default())
    }

    fn chain(outcome: &SearchOutcome) -> Option<String> {
        outcome.derivation.as_ref().map(|d| d.to_string())
    }

    #[test]
    fn finds_right_linear_derivation() {
        let grammar = grammar("S → aS | b");
        let outcome = run(&grammar, "aab");

        assert_eq!(chain(&outcome).as_deref(), Some("S → aS → aaS → aab"));
        assert_eq!(outcome.strategy, Strategy::RightLinear);
        assert!(outcome.derivation.unwrap().replays_in(&grammar));
    }

    #[test]
    fn rejects_non_member() {
        let outcome = run(&grammar("S → aS | b"), "a");

        assert!(!outcome.belongs());
        assert!(!outcome.truncated());
    }

    #[test]
    fn epsilon_start() {
        let outcome = run(&grammar("S → ε"), "");
        assert_eq!(chain(&outcome).as_deref(), Some("S → ε"));

        assert!(!run(&grammar("S → a"), "").belongs());
    }

    #[test]
    fn nested_context_free_derivation() {
        let grammar = grammar("S → aSb | ε");
        let outcome = run(&grammar, "aabb");

        assert_eq!(chain(&outcome).as_deref(), Some("S → aSb → aaSbb → aabb"));
        assert!(!run(&grammar, "aab").belongs());
    }

    #[test]
    fn left_linear_derivation() {
        let outcome = run(&grammar("S → Sa | b"), "baa");

        assert_eq!(chain(&outcome).as_deref(), Some("S → Sa → Saa → baa"));
        assert_eq!(outcome.strategy, Strategy::LeftLinear);
    }

    #[test]
    fn declaration_order_breaks_ties() {
        // Both alternatives reach "a" in two steps; S → B is declared first
        let grammar = grammar("S → B | A\nA → a\nB → a");
        let derivation = run(&grammar, "a").derivation.unwrap();

        assert_eq!(derivation.steps[0].production, 0);
        assert_eq!(derivation.to_string(), "S → B → a");
    }

    #[test]
    fn records_rewritten_positions() {
        let grammar = grammar("S → AB\nA → a\nB → b");
        let derivation = run(&grammar, "ab").derivation.unwrap();

        let positions: Vec<usize> = derivation.steps.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 0, 1]);
    }

    #[test]
    fn epsilon_loops_terminate() {
        let grammar = grammar("S → SS | A | ε\nA → S");
        let outcome = run(&grammar, "a");

        assert!(!outcome.belongs());
        assert!(outcome.stats.step_bound.is_some());
    }

    #[test]
    fn left_recursion_terminates() {
        let grammar = grammar("S → Sa | Sb | c");
        assert!(run(&grammar, "cab").belongs());
        assert!(!run(&grammar, "abc").belongs());
    }

    #[test]
    fn unproductive_grammar_is_empty() {
        let outcome = run(&grammar("S → aS"), "aaa");

        assert!(!outcome.belongs());
        assert!(!outcome.truncated());
    }

    #[test]
    fn enormous_shortest_yield() {
        // Every row multiplies the length of the shortest string by 100
        let rows = ["S → A", "A → B", "B → C", "C → D", "D → E", "E → F", "F → G", "G → H", "H → I", "I → a"]
            .iter()
            .map(|row| {
                let (lhs, rhs) = row.split_once(" → ").unwrap();
                format!("{} → {}", lhs, rhs.repeat(100))
            })
            .collect::<Vec<_>>();
        let grammar = grammar(&rows.join("\n"));
        let outcome = run(&grammar, "a");

        assert!(!outcome.belongs());
        assert!(!outcome.truncated());
        assert_eq!(outcome.stats.step_bound, None);
        assert_eq!(outcome.stats.states_explored, 1);
    }

    #[test]
    fn epsilon_free_search_is_exact() {
        // Seven steps are needed, far more than a bound of one
        let grammar = grammar("S → A\nA → B\nB → C\nC → D\nD → E\nE → F\nF → a");
        let tight = SearchConfig { length_factor: 1, extra_steps: Some(0), ..Default::default() };

        let exact = search(&grammar, classify(&grammar), "a", &tight);
        assert!(exact.belongs());
        assert_eq!(exact.stats.step_bound, None);

        let bounded = SearchConfig { exact_when_epsilon_free: false, ..tight };
        let outcome = search(&grammar, classify(&grammar), "a", &bounded);
        assert!(!outcome.belongs());
        assert!(outcome.truncated());
        assert_eq!(outcome.stats.step_bound, Some(1));
    }

    #[test]
    fn state_budget_is_respected() {
        let grammar = grammar("S → SS | a | ε");
        let config = SearchConfig { max_states: 5, ..Default::default() };
        let outcome = search(&grammar, classify(&grammar), "aaaaaaa", &config);

        assert!(!outcome.belongs());
        assert!(outcome.stats.state_limit_hit);
        assert!(outcome.truncated());
    }

    #[test]
    fn input_with_foreign_characters_is_rejected() {
        assert!(!run(&grammar("S → aS | b"), "a b").belongs());
        assert!(!run(&grammar("S → aS | b"), "aB").belongs());
    }

    #[test]
    fn cancelled_search_reports_error() {
        let grammar = grammar("S → aS | b");
        let cancel = AtomicBool::new(true);
        let result = search_cancellable(&grammar, classify(&grammar), "aab", &SearchConfig::default(), &cancel);

        assert_eq!(result, Err(SearchError::Cancelled { depth: 0 }));
    }

    #[test]
    fn uncancelled_search_matches_plain_search() {
        let grammar = grammar("S → aSb | ab");
        let cancel = AtomicBool::new(false);
        let result = search_cancellable(&grammar, classify(&grammar), "aabb", &SearchConfig::default(), &cancel);

        assert_eq!(result, Ok(run(&grammar, "aabb")));
    }
}
