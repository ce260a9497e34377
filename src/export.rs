//! # Export — Read-Only View of a Generated Sieve
//!
//! [`ResultView`] is the surface the console and file writers consume. It
//! borrows a generated engine immutably, so nothing reached through it can
//! trigger generation or change storage. Building a view over an engine that
//! has not been generated fails with [`SieveError::NotYetGenerated`]; query
//! methods on the engine itself generate on demand, but printing and saving
//! assume the caller already did.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{Sieve, SieveKind};
use crate::error::SieveError;

/// Serializable summary of one generation run (`--json` output).
#[derive(Debug, Clone, Serialize)]
pub struct SieveReport {
    pub algorithm: SieveKind,
    pub name: String,
    pub limit: u64,
    pub prime_count: u64,
    pub largest_prime: Option<u64>,
    pub memory_bytes: u64,
    pub threads: usize,
    pub parallel: bool,
    pub elapsed_ms: f64,
    pub generated_at: DateTime<Utc>,
}

pub struct ResultView<'a> {
    sieve: &'a dyn Sieve,
}

impl<'a> ResultView<'a> {
    pub fn new(sieve: &'a dyn Sieve) -> Result<Self, SieveError> {
        if !sieve.is_generated() {
            return Err(SieveError::NotYetGenerated);
        }
        Ok(ResultView { sieve })
    }

    /// Primes in ascending order.
    pub fn primes(&self) -> Box<dyn Iterator<Item = u64> + 'a> {
        self.sieve.iter_primes()
    }

    pub fn count(&self) -> u64 {
        self.sieve.count_candidates()
    }

    pub fn memory_usage(&self) -> u64 {
        self.sieve.memory_usage()
    }

    pub fn limit(&self) -> u64 {
        self.sieve.limit()
    }

    pub fn is_parallel(&self) -> bool {
        self.sieve.threads().is_parallel()
    }

    /// `Threads: N (Parallel: Yes|No)`.
    pub fn thread_summary(&self) -> String {
        self.sieve.threads().summary()
    }

    /// Console name of the layout, e.g. `Parallel WheelSieve`.
    pub fn algorithm_name(&self) -> String {
        self.sieve.kind().display_name(self.is_parallel())
    }

    pub fn largest_prime(&self) -> Option<u64> {
        self.primes().last()
    }

    pub fn report(&self, elapsed: Duration) -> SieveReport {
        let threads = self.sieve.threads();
        SieveReport {
            algorithm: self.sieve.kind(),
            name: self.algorithm_name(),
            limit: self.limit(),
            prime_count: self.count(),
            largest_prime: self.largest_prime(),
            memory_bytes: self.memory_usage(),
            threads: threads.threads(),
            parallel: threads.is_parallel(),
            elapsed_ms: elapsed.as_nanos() as f64 / 1_000_000.0,
            generated_at: Utc::now(),
        }
    }

    /// Space-separated primes, `per_line` to a line, ending with a newline
    /// unless nothing was written.
    pub fn write_primes<W: Write>(&self, mut out: W, per_line: usize) -> io::Result<()> {
        let per_line = per_line.max(1);
        let mut written = 0usize;
        for p in self.primes() {
            if written > 0 {
                out.write_all(if written % per_line == 0 { b"\n" } else { b" " })?;
            }
            write!(out, "{}", p)?;
            written += 1;
        }
        if written > 0 {
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    /// One prime per line.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| anyhow::anyhow!("cannot create {}: {}", path.display(), e))?;
        let mut out = BufWriter::new(file);
        for p in self.primes() {
            writeln!(out, "{}", p)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn generated(kind: SieveKind, limit: u64) -> Engine {
        let mut e = Engine::new(kind, limit, 1).unwrap();
        e.generate().unwrap();
        e
    }

    #[test]
    fn view_requires_generation() {
        let e = Engine::new(SieveKind::Packed, 100, 1).unwrap();
        assert_eq!(ResultView::new(&e).err(), Some(SieveError::NotYetGenerated));
    }

    #[test]
    fn accessors_are_repeatable() {
        let e = generated(SieveKind::Wheel, 100);
        let view = ResultView::new(&e).unwrap();
        assert_eq!(view.count(), 25);
        assert_eq!(view.primes().count(), 25);
        assert_eq!(view.count(), 25);
        assert_eq!(view.largest_prime(), Some(97));
        assert_eq!(view.thread_summary(), "Threads: 1 (Parallel: No)");
        assert_eq!(view.algorithm_name(), "WheelSieve");
    }

    #[test]
    fn write_primes_wraps_lines() {
        let e = generated(SieveKind::Dense, 30);
        let view = ResultView::new(&e).unwrap();
        let mut buf = Vec::new();
        view.write_primes(&mut buf, 4).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "2 3 5 7\n11 13 17 19\n23 29\n"
        );
    }

    /// Exactly `per_line` primes must not produce a blank trailing line.
    #[test]
    fn write_primes_full_last_line() {
        let e = generated(SieveKind::Packed, 30);
        let view = ResultView::new(&e).unwrap();
        let mut buf = Vec::new();
        view.write_primes(&mut buf, 5).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "2 3 5 7 11\n13 17 19 23 29\n");
    }

    #[test]
    fn write_primes_empty() {
        let e = generated(SieveKind::Packed, 1);
        let mut buf = Vec::new();
        ResultView::new(&e).unwrap().write_primes(&mut buf, 10).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn save_to_file_one_per_line() {
        let e = generated(SieveKind::Wheel, 20);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        ResultView::new(&e).unwrap().save_to_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "2\n3\n5\n7\n11\n13\n17\n19\n");
    }

    #[test]
    fn report_serializes() {
        let e = generated(SieveKind::Packed, 1000);
        let report = ResultView::new(&e)
            .unwrap()
            .report(Duration::from_millis(3));
        assert_eq!(report.prime_count, 168);
        assert_eq!(report.largest_prime, Some(997));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["algorithm"], "packed");
        assert_eq!(json["name"], "BitSieve");
        assert_eq!(json["memory_bytes"], 128);
        assert_eq!(json["elapsed_ms"], 3.0);
    }
}
