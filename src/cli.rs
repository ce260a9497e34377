//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Each subcommand
//! builds an engine, drives it, and formats results on stdout; logs go to
//! stderr through `tracing`.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use trisieve::config::{self, RunConfig, RunOverrides};
use trisieve::{benchmark, threads, Engine, ResultView, Sieve, SieveKind, ThreadConfig};

// ── Run ─────────────────────────────────────────────────────────

/// Generate primes and emit whatever output the merged configuration asks for.
pub fn run_sieve(config_path: Option<&Path>, overrides: RunOverrides) -> Result<()> {
    let base = match config_path {
        Some(path) => config::parse_toml_file(path)?,
        None => RunConfig::default(),
    };
    let cfg = base.merge(overrides)?;
    let thread_cfg = ThreadConfig::resolve(cfg.sieve.threads).with_parallel(cfg.sieve.parallel);

    info!(
        limit = cfg.sieve.limit,
        algorithm = %cfg.sieve.algorithm,
        threads = %thread_cfg,
        "trisieve starting"
    );

    let start = Instant::now();
    let mut engine = Engine::with_config(cfg.sieve.algorithm, cfg.sieve.limit, thread_cfg)?;
    engine.generate()?;
    let elapsed = start.elapsed();

    let view = ResultView::new(&engine)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cfg.output.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&view.report(elapsed))?)?;
    } else {
        if cfg.shows_count() {
            writeln!(
                out,
                "Found {} prime numbers up to {} (using {})",
                view.count(),
                view.limit(),
                view.algorithm_name()
            )?;
        }
        if cfg.output.time {
            writeln!(out, "Execution time: {} ms", elapsed.as_millis())?;
            writeln!(out, "Memory usage: {} bytes", view.memory_usage())?;
            writeln!(out, "{}", view.thread_summary())?;
        }
        if cfg.output.list {
            writeln!(
                out,
                "Prime numbers up to {} (using {}):",
                view.limit(),
                view.algorithm_name()
            )?;
            view.write_primes(&mut out, cfg.output.per_line)?;
        }
    }

    if let Some(file) = &cfg.output.file {
        view.save_to_file(file)?;
        info!(path = %file.display(), count = view.count(), "primes saved");
        if !cfg.output.json {
            writeln!(out, "Primes saved to {}", file.display())?;
        }
    }
    out.flush()?;
    Ok(())
}

// ── Is-Prime ────────────────────────────────────────────────────

/// Sieve once up to `limit` (or the largest number) and classify each number.
pub fn run_is_prime(
    limit: Option<u64>,
    algorithm: SieveKind,
    threads: usize,
    numbers: &[u64],
) -> Result<()> {
    let limit = match limit {
        Some(l) => l,
        None => numbers.iter().copied().max().unwrap_or(0),
    };
    let mut engine = Engine::new(algorithm, limit, threads)?;
    for &n in numbers {
        let verdict = if engine.is_prime(n)? {
            "prime"
        } else {
            "composite"
        };
        println!("{}: {}", n, verdict);
    }
    Ok(())
}

// ── Bench ───────────────────────────────────────────────────────

pub fn run_bench(limit: u64, threads: usize, json: bool) -> Result<()> {
    info!(limit, threads, "running benchmarks");
    let results = benchmark::run_all(limit, threads)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", benchmark::render_table(&results));
    }
    if results.iter().any(|r| !r.counts_agree) {
        anyhow::bail!("sequential and parallel prime counts differ");
    }
    Ok(())
}

// ── Thread Info ─────────────────────────────────────────────────

pub fn run_thread_info() -> Result<()> {
    println!("System information:");
    println!("  Logical cores: {}", threads::logical_cores());
    println!("  Available parallelism: {}", threads::available_parallelism());
    println!("  Auto-detected threads: {}", threads::optimal_thread_count());
    Ok(())
}
