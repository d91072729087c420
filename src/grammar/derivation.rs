use std::fmt::Display;

use super::{is_terminal_form, render_form, Grammar, SententialForm, Symbol, ARROW};

// One rewrite: the form it produced, which production was applied, and
// where the rewritten nonterminal sat in the previous form
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DerivationStep {
    pub form: SententialForm,
    pub production: usize,
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Derivation {
    pub start_symbol: char,
    pub steps: Vec<DerivationStep>,
}

impl Derivation {
    pub fn new(start_symbol: char) -> Self {
        Derivation { start_symbol, steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn initial_form(&self) -> SententialForm {
        vec![Symbol::Nonterminal(self.start_symbol)]
    }

    pub fn final_form(&self) -> SententialForm {
        self.steps
            .last()
            .map(|step| step.form.clone())
            .unwrap_or_else(|| self.initial_form())
    }

    // The terminal string this derivation ends in. Only meaningful once the
    // final form is terminal-only.
    pub fn yield_string(&self) -> String {
        self.final_form().iter().map(Symbol::as_char).collect()
    }

    // Pairs each step with the form it rewrote
    pub fn transitions(&self) -> impl Iterator<Item = (SententialForm, &DerivationStep)> {
        let initial = self.initial_form();
        let previous = std::iter::once(initial).chain(self.steps.iter().map(|s| s.form.clone()));
        previous.zip(self.steps.iter())
    }

    // Checks every step really is the application of its production at its
    // position, and that the derivation ends in a terminal-only form
    pub fn replays_in(&self, grammar: &Grammar) -> bool {
        if self.start_symbol != grammar.start_symbol {
            return false;
        }
        let sound = self.transitions().all(|(previous, step)| {
            let Some(production) = grammar.productions.get(step.production) else {
                return false;
            };
            if previous.get(step.position) != Some(&production.lhs) {
                return false;
            }
            let mut rewritten = previous[..step.position].to_vec();
            rewritten.extend_from_slice(&production.rhs);
            rewritten.extend_from_slice(&previous[step.position + 1..]);
            rewritten == step.form
        });
        sound && is_terminal_form(&self.final_form())
    }
}

// Compact one-line chain such as `S → aS → aaS → aab`
impl Display for Derivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start_symbol)?;
        for step in &self.steps {
            write!(f, " {} {}", ARROW, render_form(&step.form))?;
        }
        Ok(())
    }
}
