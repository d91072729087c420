use std::fmt::Display;

use itertools::{Itertools, PeekingNext};

use super::{GrammarErrorType, Result};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Equals,
    Or,
    Arrow,
    OpenBrace,
    CloseBrace,
    Epsilon,
    Word(String)
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Equals => write!(f, "="),
            Token::Or => write!(f, "|"),
            Token::Arrow => write!(f, "→"),
            Token::OpenBrace => write!(f, "{{"),
            Token::CloseBrace => write!(f, "}}"),
            Token::Epsilon => write!(f, "ε"),
            Token::Word(word) => write!(f, "{}", word),
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '|' | '{' | '}' | ',' | '#' | '-' | '→' | 'ε' | 'λ')
}

// Lexes the ASCII arrow `->`. The leading `-` has not been consumed yet.
pub fn lex_ascii_arrow(line: &mut impl Iterator<Item = char>) -> Result<Token> {
    line.next(); // Consume the dash
    if line.next() != Some('>') {
        return Err(GrammarErrorType::InvalidSymbol("-".to_string()));
    }

    Ok(Token::Arrow)
}

pub fn lex_word(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    Ok(Token::Word(line.peeking_take_while(|&c| is_word_char(c)).collect()))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        match c {
            // Comments run to the end of the line
            '#' => break,
            '=' | '|' | '{' | '}' | '→' | 'ε' | 'λ' => {
                line_chars.next();
                tokens.push(match c {
                    '=' => Token::Equals,
                    '|' => Token::Or,
                    '{' => Token::OpenBrace,
                    '}' => Token::CloseBrace,
                    '→' => Token::Arrow,
                    _ => Token::Epsilon,
                });
            }
            '-' => tokens.push(lex_ascii_arrow(&mut line_chars)?),
            c if c.is_whitespace() || c == ',' => {
                line_chars.next();
            }
            _ => tokens.push(lex_word(&mut line_chars)?),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    #[test]
    fn lex_normal_word() {
        let lines = vec![
            "aSb | ε",
            "S",
            "a1B}"
        ];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (word("aSb"), " | ε"),
            (word("S"), ""),
            (word("a1B"), "}")
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_word(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_broken_arrow() {
        let mut chars = "- aS".chars();
        assert_eq!(lex_ascii_arrow(&mut chars).unwrap_err(), GrammarErrorType::InvalidSymbol("-".to_string()));
    }

    #[test]
    fn lex_normal_line() {
        let lines = vec![
            "N = S A",
            "P = {",
            "    S → aS | b",
            "A -> Ab | λ }",
            "T = a, b  # the alphabet",
        ];
        let answers = vec![
            vec![word("N"), Token::Equals, word("S"), word("A")],
            vec![word("P"), Token::Equals, Token::OpenBrace],
            vec![word("S"), Token::Arrow, word("aS"), Token::Or, word("b")],
            vec![word("A"), Token::Arrow, word("Ab"), Token::Or, Token::Epsilon, Token::CloseBrace],
            vec![word("T"), Token::Equals, word("a"), word("b")],
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(lex_line(line).unwrap(), answer)
        }
    }

    #[test]
    fn lex_comment_only_line() {
        assert_eq!(lex_line("   # nothing here").unwrap(), vec![]);
    }
}
