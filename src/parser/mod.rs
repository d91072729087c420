/*
    This module parses grammars written in the `N = / T = / S = / P = { }`
    block format
*/

mod lexer;
mod verifier;

use std::fmt::Display;

use crate::config::DEFAULT_MAX_RULES;
use crate::error_handling::*;
use crate::grammar::*;
use itertools::Itertools;
use lexer::*;
use verifier::{verify_grammar, Declaration, Declarations};

#[derive(Debug, PartialEq, Clone)]
pub enum GrammarErrorType {
    // There is no `S = ...` line, or it names nothing
    MissingStartSymbol,
    // The start symbol is not one of the nonterminals
    UndeclaredStartSymbol(char),
    // Something that is neither a nonterminal nor a terminal
    InvalidSymbol(String),
    // A row rewrites a nonterminal that was not declared in `N`
    UndeclaredNonterminal(char),
    // A right-hand side uses a symbol missing from `N` or `T`
    UndeclaredSymbol(char),
    // More distinct left-hand sides than allowed
    TooManyRules { count: usize, max: usize },
    // A line inside the production block that is not a rule
    MissingArrow,
    // A rule starting with the arrow
    MissingLeftHandSide,
    // A rule rewriting more than one symbol
    MultiSymbolLeftHandSide(String),
    // `N`, `T`, `S` or `P` given twice
    DuplicateSection(char),
    // `P = {` without a matching `}`
    UnclosedProductionBlock,
    // A rule written before `P = {` or after `}`
    RuleOutsideBlock,
    // A token that has no business where it was found
    UnexpectedToken(String),
    // A line that is none of the known kinds
    UnexpectedLine,
}

impl ErrorType for GrammarErrorType {}

impl Display for GrammarErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarErrorType::MissingStartSymbol => write!(f, "Missing start symbol (expected a `S = <symbol>` line)"),
            GrammarErrorType::UndeclaredStartSymbol(c) => write!(f, "Start symbol `{}` is not a declared nonterminal", c),
            GrammarErrorType::InvalidSymbol(s) => write!(f, "`{}` is not a valid symbol (nonterminals are uppercase letters, terminals lowercase letters or digits)", s),
            GrammarErrorType::UndeclaredNonterminal(c) => write!(f, "Left-hand side `{}` is not a declared nonterminal", c),
            GrammarErrorType::UndeclaredSymbol(c) => write!(f, "Symbol `{}` is not declared as a terminal or nonterminal", c),
            GrammarErrorType::TooManyRules { count, max } => write!(f, "Grammar has {} production rows, at most {} are allowed", count, max),
            GrammarErrorType::MissingArrow => write!(f, "Expected `→` after the left-hand side"),
            GrammarErrorType::MissingLeftHandSide => write!(f, "Production has no left-hand side"),
            GrammarErrorType::MultiSymbolLeftHandSide(s) => write!(f, "Left-hand side `{}` must be a single nonterminal", s),
            GrammarErrorType::DuplicateSection(c) => write!(f, "Section `{}` is defined more than once", c),
            GrammarErrorType::UnclosedProductionBlock => write!(f, "Production block is never closed with `}}`"),
            GrammarErrorType::RuleOutsideBlock => write!(f, "Production found outside the `P = {{ ... }}` block"),
            GrammarErrorType::UnexpectedToken(t) => write!(f, "Unexpected `{}`", t),
            GrammarErrorType::UnexpectedLine => write!(f, "Expected a `N =`, `T =`, `S =` or `P = {{` line"),
        }
    }
}

pub type MalformedGrammarError = Error<GrammarErrorType>;
pub type MalformedGrammarErrors = Errors<GrammarErrorType>;

pub type Result<T> = std::result::Result<T, GrammarErrorType>;
pub type LineResult<T> = std::result::Result<T, MalformedGrammarError>;
pub type GrammarResult<T> = std::result::Result<T, MalformedGrammarErrors>;

// One production row: a left-hand side and its alternatives
#[derive(PartialEq, Debug)]
struct Row {
    lhs: char,
    alternatives: Vec<SententialForm>,
    line: usize
}

#[derive(PartialEq, Debug)]
enum Line {
    Blank,
    Header(char, Vec<String>),
    OpenBlock { row: Option<Row>, closes: bool },
    Rule { row: Row, closes: bool },
    CloseBlock,
}

fn parse_symbol(c: char) -> Result<Symbol> {
    Symbol::from_char(c).ok_or_else(|| GrammarErrorType::InvalidSymbol(c.to_string()))
}

fn parse_alternative(tokens: &[Token]) -> Result<SententialForm> {
    // ε only ever stands for "nothing", so it simply vanishes from the
    // alternative. Spaces between symbols were already dropped by the lexer.
    tokens.iter()
        .filter(|t| **t != Token::Epsilon)
        .map(|t| match t {
            Token::Word(s) => s.chars().map(parse_symbol).collect::<Result<Vec<_>>>(),
            other => Err(GrammarErrorType::UnexpectedToken(other.to_string())),
        })
        .flatten_ok()
        .collect()
}

fn parse_alternatives(tokens: &[Token]) -> Result<Vec<SententialForm>> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_lhs(token: Option<&Token>) -> Result<char> {
    match token {
        Some(Token::Word(word)) => {
            let mut chars = word.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_uppercase() => Ok(c),
                (Some(_), None) => Err(GrammarErrorType::InvalidSymbol(word.clone())),
                _ => Err(GrammarErrorType::MultiSymbolLeftHandSide(word.clone())),
            }
        }
        Some(Token::Arrow) | None => Err(GrammarErrorType::MissingLeftHandSide),
        Some(other) => Err(GrammarErrorType::UnexpectedToken(other.to_string())),
    }
}

// Splits off a trailing `}` that closes the block on the same line as a rule
fn strip_close(tokens: &[Token]) -> (&[Token], bool) {
    match tokens.split_last() {
        Some((Token::CloseBrace, rest)) => (rest, true),
        _ => (tokens, false),
    }
}

fn parse_rule(tokens: &[Token], line: usize) -> Result<Row> {
    let lhs = parse_lhs(tokens.first())?;

    if tokens.get(1) != Some(&Token::Arrow) {
        return Err(GrammarErrorType::MissingArrow);
    }

    let alternatives = parse_alternatives(&tokens[2..])?;

    Ok(Row {
        lhs,
        alternatives,
        line
    })
}

fn parse_header(section: char, tokens: &[Token], line: usize) -> Result<Line> {
    if section == 'P' {
        return match tokens.first() {
            Some(Token::OpenBrace) => {
                let (rest, closes) = strip_close(&tokens[1..]);
                let row = if rest.is_empty() { None } else { Some(parse_rule(rest, line)?) };
                Ok(Line::OpenBlock { row, closes })
            }
            Some(other) => Err(GrammarErrorType::UnexpectedToken(other.to_string())),
            None => Err(GrammarErrorType::UnexpectedToken("end of line".to_string())),
        };
    }

    let words = tokens.iter().map(|t| match t {
        Token::Word(word) => Ok(word.clone()),
        other => Err(GrammarErrorType::UnexpectedToken(other.to_string())),
    }).collect::<Result<Vec<_>>>()?;

    Ok(Line::Header(section, words))
}

fn parse_line(tokens: &[Token], line: usize, in_block: bool) -> Result<Line> {
    if tokens.is_empty() {
        return Ok(Line::Blank);
    }

    // Section headers look like `N = ...`
    if let (Some(Token::Word(name)), Some(Token::Equals)) = (tokens.first(), tokens.get(1)) {
        if let Some(section @ ('N' | 'T' | 'S' | 'P')) = name.chars().exactly_one().ok() {
            return parse_header(section, &tokens[2..], line);
        }
    }

    if tokens == [Token::CloseBrace] {
        return if in_block { Ok(Line::CloseBlock) } else { Err(GrammarErrorType::UnexpectedToken("}".to_string())) };
    }

    if !in_block {
        return if tokens.contains(&Token::Arrow) {
            Err(GrammarErrorType::RuleOutsideBlock)
        } else {
            Err(GrammarErrorType::UnexpectedLine)
        };
    }

    let (rule, closes) = strip_close(tokens);
    Ok(Line::Rule { row: parse_rule(rule, line)?, closes })
}

fn parse_lex_line(text: &str, line: usize, in_block: bool) -> LineResult<Line> {
    lexer::lex_line(text)
        .and_then(|tokens| parse_line(&tokens, line, in_block))
        .map_err(|error| Error::at(line, error))
}

fn declare(slot: &mut Option<Declaration>, section: char, words: Vec<String>, line: usize) -> LineResult<()> {
    if slot.is_some() {
        return Err(Error::at(line, GrammarErrorType::DuplicateSection(section)));
    }
    *slot = Some(Declaration { words, line });
    Ok(())
}

/// Parses a grammar, allowing at most [`DEFAULT_MAX_RULES`] rows.
pub fn parse_grammar(text: &str) -> GrammarResult<Grammar> {
    parse_grammar_with_limit(text, DEFAULT_MAX_RULES)
}

/// Parses a grammar, reporting every malformed line rather than stopping at
/// the first one.
pub fn parse_grammar_with_limit(text: &str, max_rules: usize) -> GrammarResult<Grammar> {
    let mut declarations = Declarations::default();
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut block_opened_at = None;
    let mut in_block = false;

    for (num, line) in text.lines().enumerate().map(|(num, line)| (num + 1, line)) {
        let parsed = match parse_lex_line(line, num, in_block) {
            Ok(parsed) => parsed,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };

        match parsed {
            Line::Blank => {}
            Line::Header(section, words) => {
                // A header ends an unterminated block
                if in_block {
                    in_block = false;
                    errors.push(Error::at(block_opened_at.unwrap_or(num), GrammarErrorType::UnclosedProductionBlock));
                }
                let slot = match section {
                    'N' => &mut declarations.nonterminals,
                    'T' => &mut declarations.terminals,
                    _ => &mut declarations.start,
                };
                if let Err(error) = declare(slot, section, words, num) {
                    errors.push(error);
                }
            }
            Line::OpenBlock { row, closes } => {
                in_block = !closes;
                if block_opened_at.is_some() {
                    errors.push(Error::at(num, GrammarErrorType::DuplicateSection('P')));
                    continue;
                }
                block_opened_at = Some(num);
                rows.extend(row);
            }
            Line::Rule { row, closes } => {
                in_block = !closes;
                rows.push(row);
            }
            Line::CloseBlock => in_block = false,
        }
    }

    if in_block {
        let line = block_opened_at.unwrap_or_default();
        errors.push(Error::at(line, GrammarErrorType::UnclosedProductionBlock));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let productions = rows.into_iter()
        .flat_map(|row| {
            let Row { lhs, alternatives, line } = row;
            alternatives.into_iter().map(move |rhs| (Production::new(lhs, rhs), line))
        })
        .collect_vec();

    verify_grammar(&declarations, productions, max_rules)
}
