//! # Threads — Worker Count Resolution
//!
//! Resolves the number of marking workers once, at engine construction, and
//! carries it as a plain value from then on. No process-wide rayon pool is
//! configured here: each parallel `generate()` builds its own pool of exactly
//! [`ThreadConfig::threads`] workers (see [`crate::marker`]).
//!
//! Auto-detection takes the smaller of the standard library's available
//! parallelism (which honours cgroup quotas and affinity masks) and the
//! logical CPU count reported by [`sysinfo`].

use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreadConfig {
    threads: usize,
    parallel: bool,
}

impl ThreadConfig {
    /// Resolve a requested count: `0` auto-detects, anything else is taken
    /// as-is. Parallel marking is enabled whenever more than one worker
    /// results.
    pub fn resolve(requested: usize) -> Self {
        let threads = if requested > 0 {
            requested
        } else {
            optimal_thread_count()
        };
        ThreadConfig {
            threads,
            parallel: threads > 1,
        }
    }

    /// Single worker, no dispatch.
    pub fn sequential() -> Self {
        ThreadConfig {
            threads: 1,
            parallel: false,
        }
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// True when marking will actually be dispatched to a worker pool.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.parallel && self.threads > 1
    }

    /// Enable or disable parallel marking without changing the thread count.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.set_parallel(parallel);
        self
    }

    /// Human-readable summary, e.g. `Threads: 8 (Parallel: Yes)`.
    pub fn summary(&self) -> String {
        format!(
            "Threads: {} (Parallel: {})",
            self.threads,
            if self.is_parallel() { "Yes" } else { "No" }
        )
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        ThreadConfig::resolve(0)
    }
}

impl std::fmt::Display for ThreadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Logical CPUs as seen by sysinfo (0 if the platform does not report them).
pub fn logical_cores() -> usize {
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
    );
    sys.cpus().len()
}

/// Parallelism the process may actually use.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// `min(available parallelism, logical cores)`, never below 1.
pub fn optimal_thread_count() -> usize {
    let available = available_parallelism();
    match logical_cores() {
        0 => available,
        cores => available.min(cores),
    }
    .max(1)
}
