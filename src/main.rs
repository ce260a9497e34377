//! # Main — CLI Entry Point
//!
//! Parses the command line, initializes logging, and routes subcommands to
//! the execution functions in `cli`.
//!
//! ## Subcommands
//!
//! - `run`: generate primes up to `--limit` and print the count, timing,
//!   list, JSON report, and/or write them to a file.
//! - `is-prime`: answer primality for individual numbers from one sieve.
//! - `bench`: sequential vs parallel timing for all three layouts.
//! - `thread-info`: core counts and the auto-detected worker count.
//!
//! ## Global Options
//!
//! - `--config` / `TRISIEVE_CONFIG`: TOML run file; explicit flags override it.
//! - `LOG_FORMAT=json`: JSON log lines; `RUST_LOG` filters (default `info`).

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trisieve::config::RunOverrides;
use trisieve::SieveKind;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "trisieve", about = "Find prime numbers with the Sieve of Eratosthenes")]
struct Cli {
    /// TOML run file (or set TRISIEVE_CONFIG env var)
    #[arg(long, env = "TRISIEVE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all primes up to a limit
    Run {
        /// Upper limit for finding prime numbers (default 1000000)
        #[arg(short, long)]
        limit: Option<u64>,
        /// Storage layout: dense, packed or wheel
        #[arg(short, long)]
        algorithm: Option<SieveKind>,
        /// Number of marking threads (0 = auto-detect)
        #[arg(long, env = "TRISIEVE_THREADS")]
        threads: Option<usize>,
        /// Disable parallel marking
        #[arg(long)]
        no_parallel: bool,
        /// Show the count of prime numbers
        #[arg(short, long)]
        count: bool,
        /// Show execution time, memory usage and thread configuration
        #[arg(short, long)]
        time: bool,
        /// Show the list of prime numbers
        #[arg(short = 's', long)]
        list: bool,
        /// Number of primes to print per line
        #[arg(long)]
        per_line: Option<usize>,
        /// File to save primes to, one per line
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check whether numbers are prime
    IsPrime {
        /// Sieve limit (defaults to the largest number given)
        #[arg(short, long)]
        limit: Option<u64>,
        /// Storage layout: dense, packed or wheel
        #[arg(short, long, default_value = "packed")]
        algorithm: SieveKind,
        /// Number of marking threads (0 = auto-detect)
        #[arg(long, env = "TRISIEVE_THREADS", default_value_t = 0)]
        threads: usize,
        /// Numbers to test
        #[arg(required = true)]
        numbers: Vec<u64>,
    },
    /// Compare sequential and parallel generation for every layout
    Bench {
        /// Upper limit to sieve
        #[arg(short, long, default_value_t = trisieve::DEFAULT_LIMIT)]
        limit: u64,
        /// Worker threads for the parallel runs (0 = auto-detect)
        #[arg(long, env = "TRISIEVE_THREADS", default_value_t = 0)]
        threads: usize,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display processor and thread information
    ThreadInfo,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for machine-readable logs, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            limit,
            algorithm,
            threads,
            no_parallel,
            count,
            time,
            list,
            per_line,
            output,
            json,
        } => cli::run_sieve(
            cli.config.as_deref(),
            RunOverrides {
                limit,
                algorithm,
                threads,
                no_parallel,
                count,
                time,
                list,
                per_line,
                file: output,
                json,
            },
        ),
        Commands::IsPrime {
            limit,
            algorithm,
            threads,
            numbers,
        } => cli::run_is_prime(limit, algorithm, threads, &numbers),
        Commands::Bench {
            limit,
            threads,
            json,
        } => cli::run_bench(limit, threads, json),
        Commands::ThreadInfo => cli::run_thread_info(),
    }
}
