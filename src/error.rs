//! # Error — Sieve Failure Taxonomy
//!
//! Every fallible core operation returns [`SieveError`]. Nothing is retried
//! internally: an error leaves the engine without usable query results and is
//! handed straight back to the caller.

/// Errors from sieve construction, generation, and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// `is_prime` was asked about a number above the sieve bound.
    OutOfRange { num: u64, limit: u64 },
    /// An export operation ran before `generate()` completed.
    NotYetGenerated,
    /// Storage for the requested bound could not be allocated.
    AllocationFailure { bytes: u128 },
    /// The dedicated worker pool could not be built.
    ThreadPool(String),
}

impl std::fmt::Display for SieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveError::OutOfRange { num, limit } => {
                write!(f, "number {} exceeds sieve limit {}", num, limit)
            }
            SieveError::NotYetGenerated => write!(f, "sieve has not been generated yet"),
            SieveError::AllocationFailure { bytes } => {
                write!(f, "could not allocate {} bytes of sieve storage", bytes)
            }
            SieveError::ThreadPool(msg) => write!(f, "failed to build worker pool: {}", msg),
        }
    }
}

impl std::error::Error for SieveError {}

impl From<rayon::ThreadPoolBuildError> for SieveError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        SieveError::ThreadPool(e.to_string())
    }
}
