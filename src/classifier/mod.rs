/*
    This module places grammars in the Chomsky hierarchy
*/

use std::fmt::Display;

use crate::grammar::{Grammar, RewriteRule, Symbol};

// The four classes, ordered from most to least general
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GrammarClass {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl GrammarClass {
    pub fn chomsky_type(&self) -> u8 {
        match self {
            GrammarClass::Unrestricted => 0,
            GrammarClass::ContextSensitive => 1,
            GrammarClass::ContextFree => 2,
            GrammarClass::Regular => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GrammarClass::Unrestricted => "Unrestricted",
            GrammarClass::ContextSensitive => "Context-sensitive",
            GrammarClass::ContextFree => "Context-free",
            GrammarClass::Regular => "Regular",
        }
    }
}

impl Display for GrammarClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Type {} ({})", self.chomsky_type(), self.name())
    }
}

// Which side the nonterminal of a regular grammar's productions sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linearity {
    Right,
    Left,
}

// Right-hand side shapes that matter for regularity
#[derive(Debug, PartialEq)]
enum Shape {
    // ε or a single terminal, allowed on either side
    Final,
    RightLinear,
    LeftLinear,
    Other,
}

fn shape(rhs: &[Symbol]) -> Shape {
    match rhs {
        [] | [Symbol::Terminal(_)] => Shape::Final,
        [Symbol::Terminal(_), Symbol::Nonterminal(_)] => Shape::RightLinear,
        [Symbol::Nonterminal(_), Symbol::Terminal(_)] => Shape::LeftLinear,
        _ => Shape::Other,
    }
}

fn has_single_nonterminal_lhs<R: RewriteRule>(rule: &R) -> bool {
    matches!(rule.left(), [Symbol::Nonterminal(_)])
}

// Direction of a regular grammar, or None when the rules are not regular.
// Right- and left-linear productions may not be mixed. A grammar made only
// of `A → a` and `A → ε` counts as right-linear.
pub fn regular_linearity<R: RewriteRule>(rules: &[R]) -> Option<Linearity> {
    let mut right = false;
    let mut left = false;

    for rule in rules {
        if !has_single_nonterminal_lhs(rule) {
            return None;
        }
        match shape(rule.right()) {
            Shape::Final => {}
            Shape::RightLinear => right = true,
            Shape::LeftLinear => left = true,
            Shape::Other => return None,
        }
    }

    match (right, left) {
        (true, true) => None,
        (false, true) => Some(Linearity::Left),
        _ => Some(Linearity::Right),
    }
}

fn is_context_free<R: RewriteRule>(rules: &[R]) -> bool {
    rules.iter().all(has_single_nonterminal_lhs)
}

// Non-contracting rules. The start symbol alone may be erased, provided it
// never shows up on a right-hand side.
fn is_context_sensitive<R: RewriteRule>(start: char, rules: &[R]) -> bool {
    let start = Symbol::Nonterminal(start);
    let start_on_rhs = rules.iter().any(|rule| rule.right().contains(&start));

    rules.iter().all(|rule| match rule.right() {
        [] => rule.left() == [start] && !start_on_rhs,
        rhs => rhs.len() >= rule.left().len(),
    })
}

pub fn classify_rules<R: RewriteRule>(start: char, rules: &[R]) -> GrammarClass {
    if regular_linearity(rules).is_some() {
        GrammarClass::Regular
    } else if is_context_free(rules) {
        GrammarClass::ContextFree
    } else if is_context_sensitive(start, rules) {
        GrammarClass::ContextSensitive
    } else {
        GrammarClass::Unrestricted
    }
}

pub fn classify(grammar: &Grammar) -> GrammarClass {
    classify_rules(grammar.start_symbol, &grammar.productions)
}
