/*
    This module answers the requests the web front end sends. Every call
    parses its grammar fresh and nothing is kept between calls.
*/

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::config::EngineConfig;
use crate::error_handling::join_errors;
use crate::parser::{parse_grammar_with_limit, MalformedGrammarErrors};
use crate::report::{format_classification, format_result, ClassificationResponse, ErrorResponse, EvaluationResponse};
use crate::search::search;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub grammar_text: Option<String>,
    #[serde(default)]
    pub input_string: Option<String>,
}

impl EvaluateRequest {
    pub fn new(grammar_text: impl Into<String>, input_string: impl Into<String>) -> Self {
        EvaluateRequest {
            grammar_text: Some(grammar_text.into()),
            input_string: Some(input_string.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub grammar_text: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum EvaluateError {
    // The grammar text did not parse or broke a structural rule
    MalformedGrammar(MalformedGrammarErrors),
    // No `grammar_text` field
    MissingGrammar,
    // No `input_string` field. An empty string is a valid input.
    EmptyInput,
    // The body was not a JSON object of the expected shape
    InvalidRequest(String),
}

impl Display for EvaluateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluateError::MalformedGrammar(errors) => write!(f, "Malformed grammar:\n{}", join_errors(errors)),
            EvaluateError::MissingGrammar => write!(f, "Missing required field: grammar_text"),
            EvaluateError::EmptyInput => write!(f, "Missing required field: input_string"),
            EvaluateError::InvalidRequest(reason) => write!(f, "Invalid JSON request: {}", reason),
        }
    }
}

impl std::error::Error for EvaluateError {}

impl From<MalformedGrammarErrors> for EvaluateError {
    fn from(errors: MalformedGrammarErrors) -> Self {
        EvaluateError::MalformedGrammar(errors)
    }
}

impl EvaluateError {
    pub fn status(&self) -> u16 {
        STATUS_BAD_REQUEST
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse { error: self.to_string() }
    }
}

/// Classifies the grammar and decides whether the input belongs to it.
/// Both fields are checked before anything is parsed.
pub fn evaluate(request: &EvaluateRequest, config: &EngineConfig) -> Result<EvaluationResponse, EvaluateError> {
    let grammar_text = request.grammar_text.as_deref().ok_or(EvaluateError::MissingGrammar)?;
    let input = request.input_string.as_deref().ok_or(EvaluateError::EmptyInput)?;

    let grammar = parse_grammar_with_limit(grammar_text, config.max_rules)?;
    tracing::info!(
        nonterminals = ?grammar.nonterminals,
        terminals = ?grammar.terminals,
        start = %grammar.start_symbol,
        productions = grammar.productions.len(),
        input,
        "evaluating grammar"
    );

    let class = classify(&grammar);
    let outcome = search(&grammar, class, input, &config.search);
    tracing::info!(
        grammar_type = %class,
        belongs = outcome.belongs(),
        explored = outcome.stats.states_explored,
        "evaluation finished"
    );

    Ok(format_result(class, input, &outcome))
}

// Classifies a grammar without searching for anything
pub fn check(request: &CheckRequest, config: &EngineConfig) -> Result<ClassificationResponse, EvaluateError> {
    let grammar_text = request.grammar_text.as_deref().ok_or(EvaluateError::MissingGrammar)?;
    let grammar = parse_grammar_with_limit(grammar_text, config.max_rules)?;

    Ok(format_classification(classify(&grammar)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Evaluate,
    Check,
}

pub(crate) fn reply<T: Serialize>(status: u16, body: &T) -> (u16, String) {
    match serde_json::to_string(body) {
        Ok(json) => (status, json),
        Err(error) => {
            tracing::error!(%error, "failed to serialize response");
            (STATUS_INTERNAL_ERROR, r#"{"error":"Internal server error"}"#.to_string())
        }
    }
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, EvaluateError> {
    serde_json::from_str(body).map_err(|e| EvaluateError::InvalidRequest(e.to_string()))
}

// Answers a raw JSON request body with the status code and JSON reply an
// HTTP handler sends back
pub fn handle_json(route: Route, body: &str, config: &EngineConfig) -> (u16, String) {
    let result = match route {
        Route::Evaluate => parse_body::<EvaluateRequest>(body)
            .and_then(|request| evaluate(&request, config))
            .map(|r| reply(STATUS_OK, &r)),
        Route::Check => parse_body::<CheckRequest>(body)
            .and_then(|request| check(&request, config))
            .map(|r| reply(STATUS_OK, &r)),
    };

    result.unwrap_or_else(|error| {
        tracing::warn!(%error, ?route, "request rejected");
        reply(error.status(), &error.to_response())
    })
}
