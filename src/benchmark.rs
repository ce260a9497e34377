//! # Benchmark — Sequential vs Parallel Timing
//!
//! Times each layout twice at the same bound, once with a single worker and
//! once with the requested pool size, and reports the speedup. Timing covers
//! allocation plus generation, which is what a caller of `new` + `generate`
//! pays. Prime counts from both runs are compared so a speedup is never
//! reported for a run that produced different output.

use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::engine::{Engine, Sieve, SieveKind};
use crate::error::SieveError;
use crate::threads::ThreadConfig;

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub algorithm: SieveKind,
    pub limit: u64,
    pub threads: usize,
    pub sequential_ms: f64,
    pub parallel_ms: f64,
    pub speedup: f64,
    pub memory_bytes: u64,
    pub prime_count: u64,
    pub counts_agree: bool,
}

fn timed_run(kind: SieveKind, limit: u64, threads: ThreadConfig) -> Result<(f64, Engine), SieveError> {
    let start = Instant::now();
    let mut engine = Engine::with_config(kind, limit, threads)?;
    engine.generate()?;
    Ok((start.elapsed().as_secs_f64() * 1000.0, engine))
}

/// Benchmark one layout.
pub fn compare(kind: SieveKind, limit: u64, threads: usize) -> Result<BenchmarkResult, SieveError> {
    let parallel_cfg = ThreadConfig::resolve(threads);
    let (sequential_ms, mut seq) = timed_run(kind, limit, ThreadConfig::sequential())?;
    let (parallel_ms, mut par) = timed_run(kind, limit, parallel_cfg)?;

    let prime_count = seq.prime_count()?;
    let counts_agree = prime_count == par.prime_count()?;
    let speedup = if parallel_ms > 0.0 {
        sequential_ms / parallel_ms
    } else {
        0.0
    };

    info!(
        algorithm = %kind,
        limit,
        threads = parallel_cfg.threads(),
        sequential_ms = format_args!("{:.2}", sequential_ms),
        parallel_ms = format_args!("{:.2}", parallel_ms),
        speedup = format_args!("{:.2}", speedup),
        "benchmark complete"
    );

    Ok(BenchmarkResult {
        algorithm: kind,
        limit,
        threads: parallel_cfg.threads(),
        sequential_ms,
        parallel_ms,
        speedup,
        memory_bytes: par.memory_usage(),
        prime_count,
        counts_agree,
    })
}

/// Benchmark every layout in order dense, packed, wheel.
pub fn run_all(limit: u64, threads: usize) -> Result<Vec<BenchmarkResult>, SieveError> {
    SieveKind::ALL
        .iter()
        .map(|&kind| compare(kind, limit, threads))
        .collect()
}

/// Fixed-width results table.
pub fn render_table(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    if let Some(first) = results.first() {
        let _ = writeln!(
            out,
            "Benchmark results for limit {} with {} threads:\n",
            first.limit, first.threads
        );
    }
    let _ = writeln!(
        out,
        "{:<12}{:>16}{:>16}{:>10}{:>16}",
        "Algorithm", "Sequential (ms)", "Parallel (ms)", "Speedup", "Memory (bytes)"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for r in results {
        let _ = writeln!(
            out,
            "{:<12}{:>16.2}{:>16.2}{:>10.2}{:>16}{}",
            r.algorithm.display_name(false),
            r.sequential_ms,
            r.parallel_ms,
            r.speedup,
            r.memory_bytes,
            if r.counts_agree { "" } else { "  MISMATCH" }
        );
    }
    out
}
