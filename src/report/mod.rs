/*
    This module turns classification and search results into the response
    shown to the user
*/

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::classifier::GrammarClass;
use crate::grammar::*;
use crate::search::SearchOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub grammar_type: String,
    pub belongs_to_grammar: bool,
    pub message: String,
    pub derivation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub grammar_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Renders `previous` with the symbol at `position` wrapped in asterisks
pub fn mark_rewritten(previous: &[Symbol], position: usize) -> String {
    previous.iter()
        .enumerate()
        .map(|(i, symbol)| {
            if i == position {
                format!("*{}*", symbol)
            } else {
                symbol.to_string()
            }
        })
        .collect()
}

// One line per step: the form before the step with the rewritten
// nonterminal marked, an arrow, and the form after it, e.g. `a*S* → aaS`
pub fn render_trace(derivation: &Derivation) -> String {
    derivation.transitions()
        .map(|(previous, step)| {
            format!("{} {} {}", mark_rewritten(&previous, step.position), ARROW, render_form(&step.form))
        })
        .join("\n")
}

pub fn verdict_message(class: GrammarClass, input: &str, outcome: &SearchOutcome) -> String {
    let verdict = if outcome.belongs() { "accepted" } else { "rejected" };
    let mut message = format!("Grammar is {}. String \"{}\" {}.", class, input, verdict);

    if outcome.stats.state_limit_hit && !outcome.belongs() {
        message.push_str(" The search ran out of room before finishing, so a longer derivation may exist.");
    } else if outcome.truncated() {
        if let Some(bound) = outcome.stats.step_bound {
            message.push_str(&format!(" No derivation of at most {} steps exists.", bound));
        }
    }

    message
}

pub fn format_result(class: GrammarClass, input: &str, outcome: &SearchOutcome) -> EvaluationResponse {
    EvaluationResponse {
        grammar_type: class.to_string(),
        belongs_to_grammar: outcome.belongs(),
        message: verdict_message(class, input, outcome),
        derivation: outcome.derivation.as_ref().map(render_trace),
    }
}

pub fn format_classification(class: GrammarClass) -> ClassificationResponse {
    ClassificationResponse { grammar_type: class.to_string() }
}
