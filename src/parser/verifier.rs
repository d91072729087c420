use std::collections::BTreeSet;

use itertools::Itertools;

use crate::grammar::{Grammar, Production, Symbol};
use super::GrammarErrorType::*;
use super::{Error, GrammarErrorType, GrammarResult, MalformedGrammarErrors};

// The words of one `N =`, `T =` or `S =` line
#[derive(Debug, PartialEq)]
pub struct Declaration {
    pub words: Vec<String>,
    pub line: usize
}

#[derive(Debug, PartialEq, Default)]
pub struct Declarations {
    pub nonterminals: Option<Declaration>,
    pub terminals: Option<Declaration>,
    pub start: Option<Declaration>
}

type LocatedProduction = (Production, usize);

// Turns the words of a declaration into single-character symbols of the
// expected kind, reporting every word that is not one
fn declared_symbols(declaration: &Declaration, wanted: fn(&Symbol) -> bool) -> (BTreeSet<char>, MalformedGrammarErrors) {
    let (symbols, errors): (Vec<_>, Vec<_>) = declaration.words.iter()
        .map(|word| match word.chars().exactly_one() {
            Ok(c) if Symbol::from_char(c).is_some_and(|s| wanted(&s)) => Ok(c),
            _ => Err(Error::at(declaration.line, InvalidSymbol(word.clone()))),
        })
        .partition_result();

    (symbols.into_iter().collect(), errors)
}

fn start_symbol(declaration: Option<&Declaration>) -> std::result::Result<(char, usize), MalformedGrammarErrors> {
    let declaration = declaration.ok_or_else(|| vec![Error::whole(MissingStartSymbol)])?;

    match declaration.words.as_slice() {
        [] => Err(vec![Error::at(declaration.line, MissingStartSymbol)]),
        [word] => match word.chars().exactly_one() {
            Ok(c) if c.is_ascii_uppercase() => Ok((c, declaration.line)),
            _ => Err(vec![Error::at(declaration.line, InvalidSymbol(word.clone()))]),
        },
        words => Err(vec![Error::at(declaration.line, InvalidSymbol(words.join(" ")))]),
    }
}

// Nonterminals and terminals implied by how the productions use them
fn used_symbols(productions: &[LocatedProduction], start: char) -> (BTreeSet<char>, BTreeSet<char>) {
    let mut nonterminals = BTreeSet::from([start]);
    let mut terminals = BTreeSet::new();

    for (production, _) in productions {
        nonterminals.insert(production.nonterminal());
        for symbol in &production.rhs {
            match symbol {
                Symbol::Nonterminal(c) => nonterminals.insert(*c),
                Symbol::Terminal(c) => terminals.insert(*c),
            };
        }
    }

    (nonterminals, terminals)
}

fn get_production_undeclared_symbols(
    production: &Production,
    line: usize,
    nonterminals: Option<&BTreeSet<char>>,
    terminals: Option<&BTreeSet<char>>,
) -> MalformedGrammarErrors {
    let undeclared_lhs = nonterminals
        .filter(|declared| !declared.contains(&production.nonterminal()))
        .map(|_| Error::at(line, UndeclaredNonterminal(production.nonterminal())));

    // An undeclared set means the set was inferred, so anything goes
    let undeclared_rhs = production.rhs.iter()
        .filter(|symbol| {
            let declared = match symbol {
                Symbol::Nonterminal(_) => nonterminals,
                Symbol::Terminal(_) => terminals,
            };
            declared.is_some_and(|set| !set.contains(&symbol.as_char()))
        })
        .map(|symbol| Error::at(line, UndeclaredSymbol(symbol.as_char())));

    undeclared_lhs.into_iter().chain(undeclared_rhs).collect()
}

fn get_rule_count_error(productions: &[LocatedProduction], max_rules: usize) -> Option<Error<GrammarErrorType>> {
    let count = productions.iter().map(|(p, _)| p.nonterminal()).unique().count();
    (count > max_rules).then(|| Error::whole(TooManyRules { count, max: max_rules }))
}

pub fn verify_grammar(
    declarations: &Declarations,
    productions: Vec<LocatedProduction>,
    max_rules: usize,
) -> GrammarResult<Grammar> {
    let mut errors = Vec::new();

    let declared_nonterminals = declarations.nonterminals.as_ref().map(|declaration| {
        let (symbols, bad) = declared_symbols(declaration, Symbol::is_nonterminal);
        errors.extend(bad);
        symbols
    });
    let declared_terminals = declarations.terminals.as_ref().map(|declaration| {
        let (symbols, bad) = declared_symbols(declaration, Symbol::is_terminal);
        errors.extend(bad);
        symbols
    });

    let (start, start_line) = match start_symbol(declarations.start.as_ref()) {
        Ok(start) => start,
        Err(start_errors) => {
            errors.extend(start_errors);
            return Err(errors);
        }
    };

    if declared_nonterminals.as_ref().is_some_and(|declared| !declared.contains(&start)) {
        errors.push(Error::at(start_line, UndeclaredStartSymbol(start)));
    }

    errors.extend(productions.iter().flat_map(|(production, line)| {
        get_production_undeclared_symbols(production, *line, declared_nonterminals.as_ref(), declared_terminals.as_ref())
    }));
    errors.extend(get_rule_count_error(&productions, max_rules));

    if !errors.is_empty() {
        return Err(errors);
    }

    let (used_nonterminals, used_terminals) = used_symbols(&productions, start);

    Ok(Grammar {
        nonterminals: declared_nonterminals.unwrap_or(used_nonterminals),
        terminals: declared_terminals.unwrap_or(used_terminals),
        start_symbol: start,
        productions: productions.into_iter().map(|(production, _)| production).collect(),
    })
}
