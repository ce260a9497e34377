//! # trisieve — Sieve of Eratosthenes in Three Layouts
//!
//! Generates every prime in `[0, limit]` with a dense flag array, a packed
//! bitmap, or a wheel-30 compressed bitmap, each optionally striking
//! composites on a dedicated worker pool.
//!
//! ```
//! use trisieve::{Engine, Sieve, SieveKind};
//!
//! let mut sieve = Engine::new(SieveKind::Wheel, 30, 1).unwrap();
//! assert_eq!(sieve.primes().unwrap(), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
//! assert!(sieve.is_prime(29).unwrap());
//! assert!(sieve.is_prime(31).is_err());
//! ```

pub mod benchmark;
pub mod bit_store;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod marker;
pub mod threads;
pub mod wheel;

pub use engine::{DenseSieve, Engine, GenerationState, PackedSieve, Sieve, SieveKind, WheelSieve};
pub use error::SieveError;
pub use export::{ResultView, SieveReport};
pub use threads::ThreadConfig;

/// Default upper bound when none is configured.
pub const DEFAULT_LIMIT: u64 = 1_000_000;

/// Floor of the square root of `n`, exact for all `u64`.
pub fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Storage length `limit + 1`, or `AllocationFailure` if that does not fit
/// the address space.
pub(crate) fn storage_len(limit: u64) -> Result<usize, SieveError> {
    usize::try_from(limit)
        .ok()
        .and_then(|l| l.checked_add(1))
        .ok_or(SieveError::AllocationFailure {
            bytes: limit as u128 + 1,
        })
}

/// Allocate `count` elements with a fallible reservation so that oversized
/// bounds surface as `AllocationFailure` instead of aborting the process.
pub(crate) fn try_alloc<T>(count: usize, fill: impl FnMut() -> T) -> Result<Vec<T>, SieveError> {
    let mut v = try_with_capacity(count)?;
    v.extend(std::iter::repeat_with(fill).take(count));
    Ok(v)
}

/// Empty vector with room for `count` elements, or `AllocationFailure`.
pub(crate) fn try_with_capacity<T>(count: usize) -> Result<Vec<T>, SieveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(count)
        .map_err(|_| SieveError::AllocationFailure {
            bytes: count as u128 * std::mem::size_of::<T>() as u128,
        })?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_exact_on_squares_and_neighbours() {
        for r in [0u64, 1, 2, 3, 31, 1000, 65_535, 1 << 31, (1 << 32) - 1] {
            let sq = r * r;
            assert_eq!(isqrt(sq), r);
            if sq > 0 {
                assert_eq!(isqrt(sq - 1), r - 1);
            }
            if r > 0 {
                assert_eq!(isqrt(sq + 1), r);
            }
        }
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(2), 1);
        assert_eq!(isqrt(u64::MAX), (1 << 32) - 1);
    }

    #[test]
    fn storage_len_is_limit_plus_one() {
        assert_eq!(storage_len(0).unwrap(), 1);
        assert_eq!(storage_len(999).unwrap(), 1000);
    }

    #[test]
    fn storage_len_rejects_max_bound() {
        if usize::BITS == 64 {
            assert!(matches!(
                storage_len(u64::MAX),
                Err(SieveError::AllocationFailure { .. })
            ));
        }
    }

    /// An impossible reservation must come back as an error, not an abort.
    #[test]
    fn huge_allocation_is_reported() {
        let err = try_alloc::<u64>(usize::MAX / 4, || 0).unwrap_err();
        assert!(matches!(err, SieveError::AllocationFailure { .. }));
    }

    #[test]
    fn huge_capacity_is_reported() {
        let err = try_with_capacity::<u64>(usize::MAX / 4).unwrap_err();
        assert_eq!(
            err,
            SieveError::AllocationFailure {
                bytes: (usize::MAX / 4) as u128 * 8
            }
        );
        assert!(try_with_capacity::<u64>(16).unwrap().capacity() >= 16);
    }

    #[test]
    fn oversized_engine_fails_cleanly() {
        let result = Engine::new(SieveKind::Dense, u64::MAX - 1, 1);
        assert!(matches!(result, Err(SieveError::AllocationFailure { .. })));
    }
}
