/*
    This module holds the tunable limits for parsing and searching
*/

// How many distinct left-hand sides a grammar may have
pub const DEFAULT_MAX_RULES: usize = 10;

pub const DEFAULT_LENGTH_FACTOR: usize = 2;

pub const DEFAULT_MAX_STATES: usize = 100_000;

// Limits of the breadth-first derivation search. Both are approximations a
// caller can tune, and both can reject a string that does belong:
//
// - Step bound: derivations longer than
//   `length_factor * max(1, |input|) + extra_steps` steps are not explored,
//   `extra_steps` defaulting to the number of productions. It keeps epsilon
//   loops finite.
// - State budget: at most `max_states` sentential forms are stored. Running
//   out ends the search even inside the step bound. The verdict message says
//   when either limit was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub length_factor: usize,
    pub extra_steps: Option<usize>,
    pub max_states: usize,
    // Lift the step bound for grammars without nullable nonterminals, whose
    // search space is finite anyway
    pub exact_when_epsilon_free: bool,
}

impl SearchConfig {
    pub fn step_bound(&self, input_len: usize, production_count: usize) -> usize {
        self.length_factor
            .saturating_mul(input_len.max(1))
            .saturating_add(self.extra_steps.unwrap_or(production_count))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            length_factor: DEFAULT_LENGTH_FACTOR,
            extra_steps: None,
            max_states: DEFAULT_MAX_STATES,
            exact_when_epsilon_free: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_rules: usize,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_rules: DEFAULT_MAX_RULES,
            search: SearchConfig::default(),
        }
    }
}
