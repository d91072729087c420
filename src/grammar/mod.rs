/*
    This module is for storing and manipulating grammars
*/

mod derivation;

use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

pub use derivation::{Derivation, DerivationStep};

pub const EPSILON: char = 'ε';
pub const ARROW: &str = "→";

// The base unit in a grammar rule. Terminals are lowercase ASCII letters or
// digits, nonterminals are uppercase ASCII letters.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(char),
    Nonterminal(char),
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Symbol> {
        if c.is_ascii_uppercase() {
            Some(Symbol::Nonterminal(c))
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            Some(Symbol::Terminal(c))
        } else {
            None
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Terminal(c) | Symbol::Nonterminal(c) => *c,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// An intermediate rewriting state
pub type SententialForm = Vec<Symbol>;

// Renders a form as its symbols run together, or ε when empty
pub fn render_form(form: &[Symbol]) -> String {
    if form.is_empty() {
        EPSILON.to_string()
    } else {
        form.iter().map(Symbol::as_char).collect()
    }
}

pub fn is_terminal_form(form: &[Symbol]) -> bool {
    form.iter().all(Symbol::is_terminal)
}

// A rewrite rule seen only through the shape of its two sides. Parsed
// grammars always have a single nonterminal on the left, the hierarchy rules
// do not assume one.
pub trait RewriteRule {
    fn left(&self) -> &[Symbol];
    fn right(&self) -> &[Symbol];
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: char, rhs: Vec<Symbol>) -> Self {
        Production { lhs: Symbol::Nonterminal(lhs), rhs }
    }

    pub fn nonterminal(&self) -> char {
        self.lhs.as_char()
    }
}

impl RewriteRule for Production {
    fn left(&self) -> &[Symbol] {
        std::slice::from_ref(&self.lhs)
    }

    fn right(&self) -> &[Symbol] {
        &self.rhs
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.lhs, ARROW, render_form(&self.rhs))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Grammar {
    pub nonterminals: BTreeSet<char>,
    pub terminals: BTreeSet<char>,
    pub start_symbol: char,
    // Declaration order matters: it is the tie-break order for the search
    pub productions: Vec<Production>,
}

impl Grammar {
    // Productions rewriting the given nonterminal, in declaration order,
    // along with their index in the grammar
    pub fn productions_for(&self, nonterminal: char) -> impl Iterator<Item = (usize, &Production)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.nonterminal() == nonterminal)
    }

    pub fn start_form(&self) -> SententialForm {
        vec![Symbol::Nonterminal(self.start_symbol)]
    }
}

// Writes the grammar back out in the `N = / T = / S = / P = { }` block
// format the parser reads. Consecutive productions sharing a left-hand side
// become one row so that parsing the output gives back the same grammar.
impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "N = {}", self.nonterminals.iter().join(" "))?;
        writeln!(f, "T = {}", self.terminals.iter().join(" "))?;
        writeln!(f, "S = {}", self.start_symbol)?;
        writeln!(f, "P = {{")?;
        for (lhs, row) in &self.productions.iter().chunk_by(|p| p.lhs) {
            let alternatives = row.map(|p| render_form(&p.rhs)).join(" | ");
            writeln!(f, "    {} {} {}", lhs, ARROW, alternatives)?;
        }
        write!(f, "}}")
    }
}
