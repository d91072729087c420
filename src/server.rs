/*
    This module serves the evaluate and check routes over HTTP
*/

use std::io::Read;

use tiny_http::{Header, Request, Response, Server};

use crate::config::EngineConfig;
use crate::report::ErrorResponse;
use crate::service::{handle_json, reply, Route, STATUS_BAD_REQUEST};

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_WORKERS: usize = 4;

pub type ServeError = Box<dyn std::error::Error + Send + Sync>;

fn error_reply(status: u16, message: &str) -> (u16, String) {
    reply(status, &ErrorResponse { error: message.to_string() })
}

// Picks the handler for a request line. Query strings are ignored.
pub fn dispatch(method: &str, url: &str, body: &str, config: &EngineConfig) -> (u16, String) {
    let path = url.split_once('?').map_or(url, |(path, _)| path);

    match (method, path) {
        ("POST", "/evaluate") => handle_json(Route::Evaluate, body, config),
        ("POST", "/check") => handle_json(Route::Check, body, config),
        (_, "/evaluate" | "/check") => error_reply(STATUS_METHOD_NOT_ALLOWED, "Method not allowed"),
        _ => error_reply(STATUS_NOT_FOUND, "Not found"),
    }
}

fn json_header() -> Result<Header, ServeError> {
    Header::from_bytes("Content-Type", "application/json").map_err(|()| "invalid Content-Type header".into())
}

fn answer(mut request: Request, config: &EngineConfig, content_type: &Header) {
    let mut body = String::new();
    let (status, json) = match request.as_reader().read_to_string(&mut body) {
        Ok(_) => dispatch(request.method().as_str(), request.url(), &body, config),
        Err(error) => error_reply(STATUS_BAD_REQUEST, &format!("Unreadable request body: {}", error)),
    };
    tracing::debug!(method = %request.method(), url = request.url(), status, "answering request");

    let response = Response::from_string(json)
        .with_status_code(status)
        .with_header(content_type.clone());
    if let Err(error) = request.respond(response) {
        tracing::warn!(%error, "failed to send response");
    }
}

// Answers requests from `workers` threads until the server shuts down
pub fn run(server: &Server, workers: usize, config: &EngineConfig) -> Result<(), ServeError> {
    let content_type = json_header()?;

    std::thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            scope.spawn(|| {
                for request in server.incoming_requests() {
                    answer(request, config, &content_type);
                }
            });
        }
    });

    Ok(())
}

/// Binds `address` and serves `POST /evaluate` and `POST /check` forever.
pub fn serve(address: &str, workers: usize, config: &EngineConfig) -> Result<(), ServeError> {
    let server = Server::http(address)?;
    tracing::info!(address, workers, "serving grammar evaluations");

    run(&server, workers, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpStream;

    const EVALUATE_BODY: &str = r#"{"grammar_text": "S = S\nP = {\n S → aS | b\n}", "input_string": "ab"}"#;

    fn error_of(json: &str) -> String {
        let reply: serde_json::Value = serde_json::from_str(json).unwrap();
        reply["error"].as_str().unwrap().to_string()
    }

    #[test]
    fn routes() {
        let config = EngineConfig::default();
        let check_body = r#"{"grammar_text": "S = S\nP = {\n S → aSb | ε\n}"}"#;

        let cases = [
            ("POST", "/evaluate", EVALUATE_BODY, 200),
            ("POST", "/evaluate?debug=1", EVALUATE_BODY, 200),
            ("POST", "/check", check_body, 200),
            ("POST", "/evaluate", "{}", 400),
            ("GET", "/evaluate", "", 405),
            ("PUT", "/check", check_body, 405),
            ("POST", "/validate", EVALUATE_BODY, 404),
            ("GET", "/", "", 404),
        ];

        for (method, url, body, status) in cases {
            assert_eq!(dispatch(method, url, body, &config).0, status, "{} {}", method, url);
        }
    }

    #[test]
    fn unknown_routes_answer_json() {
        let config = EngineConfig::default();

        assert_eq!(error_of(&dispatch("GET", "/evaluate", "", &config).1), "Method not allowed");
        assert_eq!(error_of(&dispatch("POST", "/nothing", "", &config).1), "Not found");
    }

    #[test]
    fn answers_over_http() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let address = server.server_addr().to_ip().unwrap();

        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(address).unwrap();
            write!(
                stream,
                "POST /evaluate HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                EVALUATE_BODY.len(),
                EVALUATE_BODY
            )
            .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        answer(server.recv().unwrap(), &EngineConfig::default(), &json_header().unwrap());
        let response = client.join().unwrap();

        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.to_ascii_lowercase().contains("content-type: application/json"), "{}", response);
        assert!(response.contains(r#""belongs_to_grammar":true"#), "{}", response);
    }
}
