mod cli;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use chomsky::config::EngineConfig;
use chomsky::error_handling::highlight;
use chomsky::grammar::Grammar;
use chomsky::parser::parse_grammar_with_limit;
use chomsky::report::render_trace;
use chomsky::service::{self, EvaluateError, EvaluateRequest, STATUS_OK};
use chomsky::{classify, generator};
use clap::Parser;
use cli::{Cli, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("\x1b[31;49;1m[{}]\x1b[39;49;1m  File error: {}\x1b[0m", path.display(), e);
        ExitCode::FAILURE
    })
}

fn load_grammar(path: &Path, config: &EngineConfig) -> Result<Grammar, ExitCode> {
    let text = read_text(path)?;
    parse_grammar_with_limit(&text, config.max_rules).map_err(|errors| {
        for error in &errors {
            eprintln!("{}", highlight(error));
        }
        ExitCode::FAILURE
    })
}

fn run_evaluate(path: &Path, input: &str, json: bool, config: &EngineConfig) -> Result<ExitCode, ExitCode> {
    let request = EvaluateRequest::new(read_text(path)?, input);

    match service::evaluate(&request, config) {
        Ok(response) if json => {
            let body = serde_json::to_string_pretty(&response).map_err(|e| {
                eprintln!("Error formatting response: {}", e);
                ExitCode::FAILURE
            })?;
            println!("{}", body);
        }
        Ok(response) => {
            println!("{}", response.message);
            if let Some(derivation) = &response.derivation {
                println!("{}", derivation);
            }
        }
        Err(EvaluateError::MalformedGrammar(errors)) => {
            for error in &errors {
                eprintln!("{}", highlight(error));
            }
            return Err(ExitCode::FAILURE);
        }
        Err(error) => {
            eprintln!("{}", error);
            return Err(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_request(route: service::Route, path: Option<&Path>, config: &EngineConfig) -> Result<ExitCode, ExitCode> {
    let body = match path {
        Some(path) => read_text(path)?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body).map_err(|e| {
                eprintln!("Could not read request from stdin: {}", e);
                ExitCode::FAILURE
            })?;
            body
        }
    };

    let (status, reply) = service::handle_json(route, &body, config);
    println!("{}", reply);

    if status == STATUS_OK { Ok(ExitCode::SUCCESS) } else { Err(ExitCode::FAILURE) }
}

fn run_sample(path: &Path, amount: u32, seed: Option<u64>, max_steps: usize, config: &EngineConfig) -> Result<ExitCode, ExitCode> {
    let grammar = load_grammar(path, config)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..amount {
        match generator::sample(&grammar, &mut rng, max_steps, 20) {
            Ok(derivation) => {
                println!("{}", derivation.yield_string());
                println!("{}\n", render_trace(&derivation));
            }
            Err(error) => {
                eprintln!("{}", highlight(&error));
                return Err(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.engine_config();

    let result = match &cli.command {
        Command::Evaluate { file, input, json } => run_evaluate(file, input, *json, &config),
        Command::Classify { file } => load_grammar(file, &config).map(|grammar| {
            println!("{}", classify(&grammar));
            ExitCode::SUCCESS
        }),
        Command::Request { route, file } => run_request((*route).into(), file.as_deref(), &config),
        Command::Serve { address, workers } => chomsky::server::serve(address, *workers, &config)
            .map(|()| ExitCode::SUCCESS)
            .map_err(|e| {
                eprintln!("\x1b[31;49;1m[{}]\x1b[39;49;1m  Server error: {}\x1b[0m", address, e);
                ExitCode::FAILURE
            }),
        Command::Sample { file, amount, seed, max_steps } => run_sample(file, *amount, *seed, *max_steps, &config),
    };

    result.unwrap_or_else(|code| code)
}
