/*
    This module samples random derivations from a grammar
*/

use rand::prelude::*;
use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // A nonterminal with nothing to rewrite it to was reached
    NoProductions(char),
    // The derivation was still unfinished after this many steps
    StepLimit(usize),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::NoProductions(nonterminal) => write!(f, "No production rewrites nonterminal `{}`", nonterminal),
            GenerateErrorType::StepLimit(steps) => write!(f, "Derivation did not finish within {} steps", steps),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<Derivation, GenerateError>;

// Derives a random member of the grammar's language, always rewriting the
// leftmost nonterminal with a uniformly chosen production
pub fn generate(grammar: &Grammar, rng: &mut impl Rng, max_steps: usize) -> GenResult {
    generate_from(grammar, grammar.start_symbol, rng, max_steps)
}

// Same as `generate`, starting from some other nonterminal
pub fn generate_from(grammar: &Grammar, start: char, rng: &mut impl Rng, max_steps: usize) -> GenResult {
    let mut derivation = Derivation::new(start);
    let mut form = vec![Symbol::Nonterminal(start)];

    while let Some(position) = form.iter().position(Symbol::is_nonterminal) {
        if derivation.len() >= max_steps {
            return Err(GenerateError::whole(GenerateErrorType::StepLimit(max_steps)));
        }
        form = generate_step(grammar, &form, position, rng, &mut derivation)?;
    }

    Ok(derivation)
}

fn generate_step(
    grammar: &Grammar,
    form: &[Symbol],
    position: usize,
    rng: &mut impl Rng,
    derivation: &mut Derivation,
) -> Result<SententialForm, GenerateError> {
    let nonterminal = form[position].as_char();
    let choices: Vec<_> = grammar.productions_for(nonterminal).collect();
    let &(production, rule) = choices
        .choose(rng)
        .ok_or_else(|| GenerateError::whole(GenerateErrorType::NoProductions(nonterminal)))?;

    let mut next = form[..position].to_vec();
    next.extend_from_slice(&rule.rhs);
    next.extend_from_slice(&form[position + 1..]);

    derivation.steps.push(DerivationStep { form: next.clone(), production, position });
    Ok(next)
}

// Samples until a derivation finishes, giving up after `attempts` tries
pub fn sample(grammar: &Grammar, rng: &mut impl Rng, max_steps: usize, attempts: usize) -> GenResult {
    let mut last_error = GenerateError::whole(GenerateErrorType::StepLimit(max_steps));
    for _ in 0..attempts {
        match generate(grammar, rng, max_steps) {
            Ok(derivation) => return Ok(derivation),
            Err(error @ Error { error: GenerateErrorType::NoProductions(_), .. }) => return Err(error),
            Err(error) => last_error = error,
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::parser::parse_grammar;

    fn grammar(productions: &str) -> Grammar {
        parse_grammar(&format!("S = S\nP = {{\n{}\n}}", productions)).unwrap()
    }

    #[test]
    fn generated_derivations_replay() {
        let grammar = grammar("S → aSb | A\nA → cA | ε");
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            if let Ok(derivation) = generate(&grammar, &mut rng, 40) {
                assert!(derivation.replays_in(&grammar), "{}", derivation);
            }
        }
    }

    #[test]
    fn single_choice_is_deterministic() {
        let grammar = grammar("S → aA\nA → b");
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(generate(&grammar, &mut rng, 10).unwrap().to_string(), "S → aA → ab");
    }

    #[test]
    fn missing_productions() {
        let grammar = grammar("S → aA");
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            generate(&grammar, &mut rng, 10).unwrap_err().error,
            GenerateErrorType::NoProductions('A')
        );
        assert_eq!(
            sample(&grammar, &mut rng, 10, 5).unwrap_err().error,
            GenerateErrorType::NoProductions('A')
        );
    }

    #[test]
    fn endless_recursion_hits_step_limit() {
        let grammar = grammar("S → aS");
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            generate(&grammar, &mut rng, 25).unwrap_err().error,
            GenerateErrorType::StepLimit(25)
        );
    }

    #[test]
    fn generate_from_other_nonterminal() {
        let grammar = grammar("S → aA\nA → b");
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(generate_from(&grammar, 'A', &mut rng, 10).unwrap().yield_string(), "b");
    }
}
