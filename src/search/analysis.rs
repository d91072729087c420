use std::collections::HashMap;

use crate::grammar::{Grammar, Symbol};

// None as soon as one symbol has no terminal yield
fn total_yield(symbols: &[Symbol], shortest: impl Fn(char) -> Option<usize>) -> Option<usize> {
    symbols.iter().try_fold(0usize, |total, symbol| {
        let length = match symbol {
            Symbol::Terminal(_) => 1,
            Symbol::Nonterminal(c) => shortest(*c)?,
        };
        Some(total.saturating_add(length))
    })
}

// Length of the shortest terminal string each nonterminal can derive.
// Nonterminals missing from the table derive no terminal string at all, so
// any form containing one is a dead end. Lengths too large for a usize are
// kept as usize::MAX, which is longer than any input.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldTable {
    shortest: HashMap<char, usize>,
}

impl YieldTable {
    pub fn new(grammar: &Grammar) -> Self {
        let mut shortest: HashMap<char, usize> = HashMap::new();

        // Relax until nothing shrinks. Values only ever decrease, so this
        // settles after at most one pass per production.
        loop {
            let mut changed = false;
            for production in &grammar.productions {
                let Some(cost) = total_yield(&production.rhs, |c| shortest.get(&c).copied()) else {
                    continue;
                };
                let lhs = production.nonterminal();
                if shortest.get(&lhs).map_or(true, |&known| cost < known) {
                    shortest.insert(lhs, cost);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        YieldTable { shortest }
    }

    pub fn shortest_yield(&self, nonterminal: char) -> Option<usize> {
        self.shortest.get(&nonterminal).copied()
    }

    pub fn has_nullable(&self) -> bool {
        self.shortest.values().any(|&length| length == 0)
    }

    // Shortest terminal string the whole form can still turn into, or None
    // when some nonterminal in it can never finish
    pub fn form_yield(&self, form: &[Symbol]) -> Option<usize> {
        total_yield(form, |c| self.shortest_yield(c))
    }
}
