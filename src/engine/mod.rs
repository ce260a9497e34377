//! # Engine — Sieve Variants Behind One Contract
//!
//! Three storage layouts of the same Sieve of Eratosthenes:
//!
//! | Variant | Storage | Candidate sense | Footprint |
//! |---------|---------|-----------------|-----------|
//! | [`DenseSieve`]  | `Vec<bool>`, index = n | `true` = candidate | `limit + 1` bytes |
//! | [`PackedSieve`] | [`BitStore`](crate::bit_store::BitStore), index = n | bit 0 = candidate | `ceil((limit+1)/64) * 8` |
//! | [`WheelSieve`]  | [`BitStore`](crate::bit_store::BitStore), index = wheel index | bit 0 = candidate | `ceil(count/64) * 8` |
//!
//! All three implement [`Sieve`]; [`Engine`] is the closed set of variants
//! selected at runtime by [`SieveKind`].
//!
//! ## Lifecycle
//!
//! `NotGenerated → Generating → Generated`. `generate()` is a no-op once
//! generated. Queries (`is_prime`, `primes`, `prime_count`) generate on
//! demand; if generation fails the state falls back to `NotGenerated` and the
//! error is returned with no partial results.

mod dense;
mod packed;
mod wheel;

pub use dense::DenseSieve;
pub use packed::PackedSieve;
pub use wheel::WheelSieve;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SieveError;
use crate::marker::ParallelMarker;
use crate::threads::ThreadConfig;
use crate::try_with_capacity;

/// Generation lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    NotGenerated,
    Generating,
    Generated,
}

/// Storage layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SieveKind {
    Dense,
    Packed,
    Wheel,
}

impl SieveKind {
    pub const ALL: [SieveKind; 3] = [SieveKind::Dense, SieveKind::Packed, SieveKind::Wheel];

    /// Display name used in console output, e.g. `Parallel BitSieve`.
    pub fn display_name(&self, parallel: bool) -> String {
        let base = match self {
            SieveKind::Dense => "BasicSieve",
            SieveKind::Packed => "BitSieve",
            SieveKind::Wheel => "WheelSieve",
        };
        if parallel {
            format!("Parallel {}", base)
        } else {
            base.to_string()
        }
    }
}

impl std::fmt::Display for SieveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveKind::Dense => write!(f, "dense"),
            SieveKind::Packed => write!(f, "packed"),
            SieveKind::Wheel => write!(f, "wheel"),
        }
    }
}

impl std::str::FromStr for SieveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dense" | "basic" => Ok(SieveKind::Dense),
            "packed" | "bit" => Ok(SieveKind::Packed),
            "wheel" => Ok(SieveKind::Wheel),
            other => Err(format!(
                "unknown algorithm '{}' (expected dense, packed or wheel)",
                other
            )),
        }
    }
}

/// Shared generate/query contract of every sieve layout.
///
/// Implementors supply the storage-specific pieces (`generate`, `flag`,
/// `count_candidates`, `iter_primes`); the query methods are derived.
pub trait Sieve {
    fn kind(&self) -> SieveKind;

    /// Inclusive upper bound of the candidate range.
    fn limit(&self) -> u64;

    fn threads(&self) -> ThreadConfig;

    fn state(&self) -> GenerationState;

    fn is_generated(&self) -> bool {
        self.state() == GenerationState::Generated
    }

    /// Run the sieve. Idempotent.
    fn generate(&mut self) -> Result<(), SieveError>;

    /// Storage footprint in bytes.
    fn memory_usage(&self) -> u64;

    /// Raw stored flag, without generating. `false` for `num > limit`.
    fn flag(&self, num: u64) -> bool;

    /// Number of surviving candidates in storage, without generating.
    fn count_candidates(&self) -> u64;

    /// Surviving candidates in ascending order, without generating.
    fn iter_primes(&self) -> Box<dyn Iterator<Item = u64> + '_>;

    fn is_prime(&mut self, num: u64) -> Result<bool, SieveError> {
        let limit = self.limit();
        if num > limit {
            return Err(SieveError::OutOfRange { num, limit });
        }
        self.generate()?;
        Ok(self.flag(num))
    }

    /// Fails with `AllocationFailure` if the result vector cannot be reserved.
    fn primes(&mut self) -> Result<Vec<u64>, SieveError> {
        self.generate()?;
        let mut primes = try_with_capacity(estimate_prime_count(self.limit()))?;
        primes.extend(self.iter_primes());
        Ok(primes)
    }

    fn prime_count(&mut self) -> Result<u64, SieveError> {
        self.generate()?;
        Ok(self.count_candidates())
    }
}

/// Estimate pi(n) from above to size result vectors.
fn estimate_prime_count(n: u64) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.3 * nf / nf.ln()) as usize
}

/// Drive one generation run: state transitions, marker construction,
/// logging. `mark` performs the sequential outer loop over candidates.
pub(crate) fn run_generation(
    kind: SieveKind,
    limit: u64,
    threads: ThreadConfig,
    state: &mut GenerationState,
    mark: impl FnOnce(&ParallelMarker),
) -> Result<(), SieveError> {
    run_generation_with(kind, limit, threads, state, ParallelMarker::new, mark)
}

/// [`run_generation`] with the marker constructor supplied by the caller.
/// A failed build leaves `state` at `NotGenerated` and never calls `mark`.
fn run_generation_with(
    kind: SieveKind,
    limit: u64,
    threads: ThreadConfig,
    state: &mut GenerationState,
    build: impl FnOnce(ThreadConfig) -> Result<ParallelMarker, SieveError>,
    mark: impl FnOnce(&ParallelMarker),
) -> Result<(), SieveError> {
    if *state == GenerationState::Generated {
        return Ok(());
    }
    *state = GenerationState::Generating;

    let marker = match build(threads) {
        Ok(m) => m,
        Err(e) => {
            *state = GenerationState::NotGenerated;
            return Err(e);
        }
    };

    debug!(
        algorithm = %kind,
        limit,
        threads = threads.threads(),
        parallel = marker.is_parallel(),
        "sieve generation starting"
    );
    let start = Instant::now();
    mark(&marker);
    *state = GenerationState::Generated;

    info!(
        algorithm = %kind,
        limit,
        elapsed_ms = format_args!("{:.3}", start.elapsed().as_secs_f64() * 1000.0),
        threads = %threads,
        "sieve generated"
    );
    Ok(())
}

/// Any of the three layouts, chosen at runtime.
pub enum Engine {
    Dense(DenseSieve),
    Packed(PackedSieve),
    Wheel(WheelSieve),
}

impl Engine {
    /// Build an engine; `threads = 0` auto-detects.
    pub fn new(kind: SieveKind, limit: u64, threads: usize) -> Result<Self, SieveError> {
        Engine::with_config(kind, limit, ThreadConfig::resolve(threads))
    }

    pub fn with_config(
        kind: SieveKind,
        limit: u64,
        threads: ThreadConfig,
    ) -> Result<Self, SieveError> {
        Ok(match kind {
            SieveKind::Dense => Engine::Dense(DenseSieve::with_config(limit, threads)?),
            SieveKind::Packed => Engine::Packed(PackedSieve::with_config(limit, threads)?),
            SieveKind::Wheel => Engine::Wheel(WheelSieve::with_config(limit, threads)?),
        })
    }

    fn inner(&self) -> &dyn Sieve {
        match self {
            Engine::Dense(s) => s,
            Engine::Packed(s) => s,
            Engine::Wheel(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sieve {
        match self {
            Engine::Dense(s) => s,
            Engine::Packed(s) => s,
            Engine::Wheel(s) => s,
        }
    }
}

impl Sieve for Engine {
    fn kind(&self) -> SieveKind {
        self.inner().kind()
    }

    fn limit(&self) -> u64 {
        self.inner().limit()
    }

    fn threads(&self) -> ThreadConfig {
        self.inner().threads()
    }

    fn state(&self) -> GenerationState {
        self.inner().state()
    }

    fn generate(&mut self) -> Result<(), SieveError> {
        self.inner_mut().generate()
    }

    fn memory_usage(&self) -> u64 {
        self.inner().memory_usage()
    }

    fn flag(&self, num: u64) -> bool {
        self.inner().flag(num)
    }

    fn count_candidates(&self) -> u64 {
        self.inner().count_candidates()
    }

    fn iter_primes(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        self.inner().iter_primes()
    }
}
