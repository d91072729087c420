use std::fmt::Display;

use crate::classifier::{regular_linearity, GrammarClass, Linearity};
use crate::grammar::{Grammar, Symbol};

use super::analysis::YieldTable;

// How aggressively the search throws away sentential forms. Every strategy
// only discards forms that can never turn into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    // Regular grammars whose nonterminal trails: the terminal prefix is final
    RightLinear,
    // Regular grammars whose nonterminal leads: the terminal suffix is final
    LeftLinear,
    // Everything else: prefix, suffix and shortest-yield checks together
    General,
}

impl Strategy {
    pub fn for_grammar(grammar: &Grammar, class: GrammarClass) -> Self {
        match class {
            GrammarClass::Regular => match regular_linearity(&grammar.productions) {
                Some(Linearity::Left) => Strategy::LeftLinear,
                _ => Strategy::RightLinear,
            },
            GrammarClass::ContextFree | GrammarClass::ContextSensitive | GrammarClass::Unrestricted => Strategy::General,
        }
    }

    fn checks_prefix(&self) -> bool {
        !matches!(self, Strategy::LeftLinear)
    }

    fn checks_suffix(&self) -> bool {
        !matches!(self, Strategy::RightLinear)
    }

    fn checks_yield(&self) -> bool {
        matches!(self, Strategy::General)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::RightLinear => write!(f, "right-linear"),
            Strategy::LeftLinear => write!(f, "left-linear"),
            Strategy::General => write!(f, "general"),
        }
    }
}

// Decides which successor forms are worth keeping for a given target
pub struct Pruner<'a> {
    strategy: Strategy,
    target: &'a [char],
    yields: &'a YieldTable,
}

impl<'a> Pruner<'a> {
    pub fn new(strategy: Strategy, target: &'a [char], yields: &'a YieldTable) -> Self {
        Pruner { strategy, target, yields }
    }

    pub fn admits(&self, form: &[Symbol]) -> bool {
        // Terminals are never rewritten, so their count only grows
        let terminals = form.iter().filter(|s| s.is_terminal()).count();
        if terminals > self.target.len() {
            return false;
        }

        if self.strategy.checks_prefix() && !self.prefix_fits(form) {
            return false;
        }

        if self.strategy.checks_suffix() && !self.suffix_fits(form) {
            return false;
        }

        if self.strategy.checks_yield() {
            return self.yields.form_yield(form).is_some_and(|length| length <= self.target.len());
        }

        true
    }

    // The terminals before the first nonterminal must open the target
    fn prefix_fits(&self, form: &[Symbol]) -> bool {
        let prefix = form.iter().take_while(|s| s.is_terminal());
        fits(prefix, self.target.iter())
    }

    // The terminals after the last nonterminal must close the target
    fn suffix_fits(&self, form: &[Symbol]) -> bool {
        let suffix = form.iter().rev().take_while(|s| s.is_terminal());
        fits(suffix, self.target.iter().rev())
    }
}

fn fits<'s, 't>(
    mut symbols: impl Iterator<Item = &'s Symbol>,
    mut target: impl Iterator<Item = &'t char>,
) -> bool {
    symbols.all(|symbol| target.next() == Some(&symbol.as_char()))
}
