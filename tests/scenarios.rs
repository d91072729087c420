// End-to-end evaluations through the request boundary: parse, classify,
// search and format, as for a request from the web form

use chomsky::parser::GrammarErrorType;
use chomsky::service::{handle_json, Route};
use chomsky::{evaluate, EngineConfig, EvaluateError, EvaluateRequest};
use rstest::rstest;

fn grammar_text(productions: &str) -> String {
    format!("N = S A B\nT = a b c\nS = S\nP = {{\n{}\n}}", productions)
}

fn run(productions: &str, input: &str) -> chomsky::report::EvaluationResponse {
    evaluate(&EvaluateRequest::new(grammar_text(productions), input), &EngineConfig::default())
        .expect("grammar should be well formed")
}

#[rstest]
#[case::scenario_a("S → aS | b", "aab", "*S* → aS\na*S* → aaS\naa*S* → aab")]
#[case::scenario_c("S → ε", "", "*S* → ε")]
#[case::scenario_d("S → aSb | ε", "aabb", "*S* → aSb\na*S*b → aaSbb\naa*S*bb → aabb")]
#[case::left_linear("S → Sa | b", "baa", "*S* → Sa\n*S*a → Saa\n*S*aa → baa")]
#[case::two_nonterminals("S → AB\nA → a\nB → b", "ab", "*S* → AB\n*A*B → aB\na*B* → ab")]
fn accepted(#[case] productions: &str, #[case] input: &str, #[case] trace: &str) {
    let response = run(productions, input);

    assert!(response.belongs_to_grammar, "{}", response.message);
    assert_eq!(response.derivation.as_deref(), Some(trace));
}

#[rstest]
#[case::scenario_b("S → aS | b", "a")]
#[case::wrong_order("S → aSb | ε", "abab")]
#[case::empty_not_derivable("S → aS | b", "")]
#[case::unknown_character("S → aS | b", "ax")]
#[case::unbalanced("S → aSb | ab", "aaabb")]
fn rejected(#[case] productions: &str, #[case] input: &str) {
    let response = run(productions, input);

    assert!(!response.belongs_to_grammar);
    assert_eq!(response.derivation, None);
    assert!(response.message.ends_with("rejected."), "{}", response.message);
}

#[rstest]
#[case("S → aS | b", "Type 3 (Regular)")]
#[case("S → Sa | b", "Type 3 (Regular)")]
#[case("S → aA\nA → Sb | b", "Type 2 (Context-free)")]
#[case("S → aSb | ε", "Type 2 (Context-free)")]
#[case("S → A\nA → a", "Type 2 (Context-free)")]
fn grammar_types(#[case] productions: &str, #[case] expected: &str) {
    assert_eq!(run(productions, "a").grammar_type, expected);
}

#[test]
fn scenario_e_missing_start_line() {
    let text = "N = S\nT = a b\nP = {\n    S → aS | b\n}";
    let result = evaluate(&EvaluateRequest::new(text, "ab"), &EngineConfig::default());

    match result {
        Err(EvaluateError::MalformedGrammar(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].error, GrammarErrorType::MissingStartSymbol);
        }
        other => panic!("expected a malformed grammar, got {:?}", other),
    }
}

#[test]
fn scenario_e_over_json() {
    let body = serde_json::json!({
        "grammar_text": "N = S\nT = a b\nP = {\n    S → aS | b\n}",
        "input_string": "ab",
    });
    let (status, reply) = handle_json(Route::Evaluate, &body.to_string(), &EngineConfig::default());
    let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();

    assert_eq!(status, 400);
    assert!(reply["error"].as_str().unwrap().contains("Missing start symbol"));
    assert!(reply.get("belongs_to_grammar").is_none());
}

#[test]
fn full_json_round_trip() {
    let body = serde_json::json!({
        "grammar_text": "N = S\nT = a b\nS = S\nP = {\n    S → aS | b\n}",
        "input_string": "aab",
    });
    let (status, reply) = handle_json(Route::Evaluate, &body.to_string(), &EngineConfig::default());
    let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();

    assert_eq!(status, 200);
    assert_eq!(reply["grammar_type"], "Type 3 (Regular)");
    assert_eq!(reply["belongs_to_grammar"], true);
    assert_eq!(reply["message"], "Grammar is Type 3 (Regular). String \"aab\" accepted.");
    assert_eq!(reply["derivation"], "*S* → aS\na*S* → aaS\naa*S* → aab");
}

#[test]
fn undeclared_terminal_is_malformed() {
    let text = "N = S\nT = a\nS = S\nP = {\n    S → aS | b\n}";
    let result = evaluate(&EvaluateRequest::new(text, "ab"), &EngineConfig::default());

    assert!(matches!(result, Err(EvaluateError::MalformedGrammar(ref e)) if e[0].error == GrammarErrorType::UndeclaredSymbol('b')));
}

#[test]
fn eleven_rows_are_too_many() {
    let rows: Vec<String> = "SABCDEFGHIJ".chars().map(|c| format!("    {} → a", c)).collect();
    let text = format!("S = S\nP = {{\n{}\n}}", rows.join("\n"));
    let result = evaluate(&EvaluateRequest::new(text, "a"), &EngineConfig::default());

    assert!(matches!(
        result,
        Err(EvaluateError::MalformedGrammar(ref e)) if e[0].error == GrammarErrorType::TooManyRules { count: 11, max: 10 }
    ));
}

#[test]
fn requests_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|n| {
            std::thread::spawn(move || {
                let input = format!("{}b", "a".repeat(n));
                run("S → aS | b", &input).belongs_to_grammar
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
