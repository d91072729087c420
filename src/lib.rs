/*
    Parses textual grammars, places them in the Chomsky hierarchy and
    decides, with a derivation as evidence, whether a string belongs to the
    language they generate
*/

pub mod classifier;
pub mod config;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod parser;
pub mod report;
pub mod search;
pub mod server;
pub mod service;

pub use classifier::{classify, GrammarClass};
pub use config::{EngineConfig, SearchConfig};
pub use grammar::{Derivation, DerivationStep, Grammar, Production, SententialForm, Symbol};
pub use parser::{parse_grammar, parse_grammar_with_limit, GrammarErrorType, MalformedGrammarError};
pub use search::{search, search_cancellable, SearchOutcome};
pub use service::{evaluate, EvaluateError, EvaluateRequest};
