use std::path::PathBuf;

use chomsky::config::{EngineConfig, SearchConfig, DEFAULT_LENGTH_FACTOR, DEFAULT_MAX_RULES, DEFAULT_MAX_STATES};
use chomsky::server::{DEFAULT_ADDRESS, DEFAULT_WORKERS};
use chomsky::service::Route;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Most distinct left-hand sides a grammar may have
    #[arg(long, global = true, value_name = "ROWS", default_value_t = DEFAULT_MAX_RULES)]
    pub max_rules: usize,

    /// Multiplier of the input length in the search step bound
    #[arg(long, global = true, value_name = "FACTOR", default_value_t = DEFAULT_LENGTH_FACTOR)]
    pub length_factor: usize,

    /// Steps added to the search step bound (default: number of productions)
    #[arg(long, global = true, value_name = "STEPS")]
    pub extra_steps: Option<usize>,

    /// Most sentential forms a search may store
    #[arg(long, global = true, value_name = "STATES", default_value_t = DEFAULT_MAX_STATES)]
    pub max_states: usize,

    /// Apply the step bound even to grammars without erasing nonterminals
    #[arg(long, global = true)]
    pub bounded: bool,

    /// Log search progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool
}

#[derive(Subcommand)]
pub enum Command {
    /// Decide whether a string belongs to a grammar
    Evaluate {
        /// File containing the grammar
        file: PathBuf,

        /// String to look for
        input: String,

        /// Print the JSON response instead of text
        #[arg(long)]
        json: bool
    },

    /// Print where a grammar sits in the Chomsky hierarchy
    Classify {
        /// File containing the grammar
        file: PathBuf
    },

    /// Answer a JSON request body the way the web endpoint does
    Request {
        #[arg(value_enum)]
        route: RouteArg,

        /// File containing the request body (default: stdin)
        file: Option<PathBuf>
    },

    /// Serve POST /evaluate and POST /check over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        address: String,

        /// Threads answering requests
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize
    },

    /// Print random strings of the grammar with their derivations
    Sample {
        /// File containing the grammar
        file: PathBuf,

        /// Amount to generate (default: 1)
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Give up on a derivation after this many steps
        #[arg(long, value_name = "STEPS", default_value_t = 50)]
        max_steps: usize
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RouteArg {
    Evaluate,
    Check
}

impl From<RouteArg> for Route {
    fn from(route: RouteArg) -> Self {
        match route {
            RouteArg::Evaluate => Route::Evaluate,
            RouteArg::Check => Route::Check,
        }
    }
}

impl Cli {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_rules: self.max_rules,
            search: SearchConfig {
                length_factor: self.length_factor,
                extra_steps: self.extra_steps,
                max_states: self.max_states,
                exact_when_epsilon_free: !self.bounded,
            },
        }
    }
}
