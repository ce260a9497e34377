//! # Marker — Parallel Composite Marking
//!
//! Strikes the multiples of one fixed prime `p`, either inline on the calling
//! thread or split across a dedicated rayon pool. The outer loop over
//! candidate primes never runs here: whether the next candidate is prime
//! depends on every strike made for smaller primes, so each engine walks its
//! candidates sequentially and calls into the marker once per prime. Every
//! `mark_*` call returns only after all of its chunks have finished.
//!
//! ## Work Sharing
//!
//! Chunks are counted in strikes, i.e. iterations of the stride-`p` loop
//! over `[p², limit]`. With `iters` strikes in total, each chunk holds
//! `max(iters / (threads · scale), floor)` of them, which is
//! `chunk · p` storage indices starting on a multiple of `p`. For the wheel
//! the iterations are the wheel cofactors `k`. Chunks are handed to the pool
//! as a fixed list; no chunk is ever split further.
//!
//! | Layout | scale | floor |
//! |--------|-------|-------|
//! | Dense  | 4     | 1000  |
//! | Packed | 8     | 500   |
//! | Wheel  | 8     | 200   |
//!
//! ## Write Safety
//!
//! - **Dense**: the flag slice is split with `par_chunks_mut`, so each worker
//!   holds an exclusive `&mut` sub-slice and no synchronization is needed.
//! - **Packed / Wheel**: one `u64` word holds 64 candidates, so two workers
//!   striking different indices can hit the same word. Every concurrent write
//!   is a `fetch_or` on the word ([`BitStore::set_shared`]).

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::bit_store::BitStore;
use crate::error::SieveError;
use crate::threads::ThreadConfig;
use crate::wheel;

/// Chunk sizing for one storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub scale: usize,
    pub min_chunk: usize,
}

impl ChunkPolicy {
    pub const DENSE: ChunkPolicy = ChunkPolicy {
        scale: 4,
        min_chunk: 1000,
    };
    /// Smaller floor keeps each worker on few cache lines of packed words.
    pub const PACKED: ChunkPolicy = ChunkPolicy {
        scale: 8,
        min_chunk: 500,
    };
    pub const WHEEL: ChunkPolicy = ChunkPolicy {
        scale: 8,
        min_chunk: 200,
    };

    /// Strikes per chunk: `max(iters / (threads * scale), min_chunk)`.
    pub fn chunk_size(&self, iters: usize, threads: usize) -> usize {
        (iters / (threads.max(1) * self.scale)).max(self.min_chunk)
    }

    /// Storage indices per chunk for a stride-`stride` strike loop spanning
    /// `span` indices from its first strike.
    pub fn index_chunk(&self, span: usize, threads: usize, stride: usize) -> usize {
        let stride = stride.max(1);
        let iters = span / stride + 1;
        self.chunk_size(iters, threads).saturating_mul(stride)
    }
}

/// Per-call marking strategy. Holds a worker pool only while a parallel
/// `generate()` is running; dropping it joins and releases the workers.
pub struct ParallelMarker {
    threads: ThreadConfig,
    pool: Option<ThreadPool>,
}

impl ParallelMarker {
    /// Build the marker for one generation run. A pool is created only when
    /// the configuration asks for more than one worker.
    pub fn new(threads: ThreadConfig) -> Result<Self, SieveError> {
        let pool = if threads.is_parallel() {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads.threads())
                    .thread_name(|i| format!("sieve-marker-{}", i))
                    .build()?,
            )
        } else {
            None
        };
        Ok(ParallelMarker { threads, pool })
    }

    /// Inline marking only.
    pub fn sequential() -> Self {
        ParallelMarker {
            threads: ThreadConfig::sequential(),
            pool: None,
        }
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn threads(&self) -> ThreadConfig {
        self.threads
    }

    /// Dense layout: set `flags[i] = false` for `i = p², p² + p, …`.
    /// `flags.len()` is `limit + 1`.
    pub fn mark_flags(&self, flags: &mut [bool], p: usize) {
        let start = p * p;
        if start >= flags.len() {
            return;
        }
        let region = &mut flags[start..];
        match &self.pool {
            None => region.iter_mut().step_by(p).for_each(|f| *f = false),
            Some(pool) => {
                let len =
                    ChunkPolicy::DENSE.index_chunk(region.len() - 1, self.threads.threads(), p);
                pool.install(|| {
                    region
                        .par_chunks_mut(len)
                        .for_each(|chunk| chunk.iter_mut().step_by(p).for_each(|f| *f = false));
                });
            }
        }
    }

    /// Packed layout: set bit `i` (composite) for `i = p², p² + p, …, <= limit`.
    pub fn mark_bits(&self, store: &mut BitStore, p: usize, limit: usize) {
        let start = p * p;
        if start > limit {
            return;
        }
        match &self.pool {
            None => (start..=limit).step_by(p).for_each(|i| store.set(i)),
            Some(pool) => {
                let span = limit - start;
                let len = ChunkPolicy::PACKED.index_chunk(span, self.threads.threads(), p);
                let chunks = span / len + 1;
                let store = &*store;
                pool.install(|| {
                    (0..chunks).into_par_iter().for_each(|c| {
                        let lo = start + c * len;
                        let hi = lo.saturating_add(len).min(limit + 1);
                        (lo..hi).step_by(p).for_each(|i| store.set_shared(i));
                    });
                });
            }
        }
    }

    /// Wheel layout: strike `p·k` for every wheel number `k` with
    /// `p <= k <= limit / p`.
    ///
    /// Multiples of `p` that are divisible by 2, 3 or 5 have no slot in the
    /// compressed array and are already non-prime, so walking `k` over wheel
    /// numbers reaches every multiple that needs striking. The chunked range
    /// is the compressed index of `k`.
    pub fn mark_wheel(&self, store: &mut BitStore, p: u64, limit: u64) {
        let first = wheel::index_of(p);
        let end = wheel::count_up_to(limit / p);
        if end <= first {
            return;
        }
        let strike = move |j: usize| wheel::index_of(p * wheel::number_at(j));
        match &self.pool {
            None => (first..end).for_each(|j| store.set(strike(j))),
            Some(pool) => {
                let span = end - first;
                let len = ChunkPolicy::WHEEL.chunk_size(span, self.threads.threads());
                let chunks = span.div_ceil(len);
                let store = &*store;
                pool.install(|| {
                    (0..chunks).into_par_iter().for_each(|c| {
                        let lo = first + c * len;
                        let hi = (lo + len).min(end);
                        (lo..hi).for_each(|j| store.set_shared(strike(j)));
                    });
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! # Marker Tests
    //!
    //! Each layout is marked once inline and once through a 4-worker pool;
    //! the resulting storage must be identical. Small primes over a large
    //! bound give many chunks, so word sharing between workers really
    //! happens in the packed case.

    use super::*;

    fn pooled(threads: usize) -> ParallelMarker {
        ParallelMarker::new(ThreadConfig::resolve(threads)).unwrap()
    }

    // ── Chunk Policy ────────────────────────────────────────────────

    #[test]
    fn chunk_size_respects_floor() {
        assert_eq!(ChunkPolicy::DENSE.chunk_size(100, 4), 1000);
        assert_eq!(ChunkPolicy::PACKED.chunk_size(100, 4), 500);
        assert_eq!(ChunkPolicy::WHEEL.chunk_size(100, 4), 200);
    }

    #[test]
    fn chunk_size_scales_with_threads() {
        // 1_000_000 / (4 * 4) = 62_500
        assert_eq!(ChunkPolicy::DENSE.chunk_size(1_000_000, 4), 62_500);
        // 1_000_000 / (4 * 8) = 31_250
        assert_eq!(ChunkPolicy::PACKED.chunk_size(1_000_000, 4), 31_250);
    }

    /// limit 10^6, p = 7: (10^6 - 49) / 7 + 1 = 142_850 strikes,
    /// / (4 * 8) = 4_464 strikes per chunk = 31_248 indices.
    #[test]
    fn index_chunk_counts_strikes() {
        let span = 1_000_000 - 49;
        let len = ChunkPolicy::PACKED.index_chunk(span, 4, 7);
        assert_eq!(len, 4_464 * 7);
        assert_eq!(len % 7, 0);
    }

    /// A small region for a large prime stays one chunk of at least the
    /// floor in strikes, never a few strikes per chunk.
    #[test]
    fn index_chunk_floor_is_in_strikes() {
        let p = 97;
        let len = ChunkPolicy::PACKED.index_chunk(10_000 - p * p, 4, p);
        assert_eq!(len, 500 * p);
        assert!(len / p >= 500);
        let len = ChunkPolicy::DENSE.index_chunk(10_000 - p * p, 4, p);
        assert_eq!(len / p, 1000);
    }

    // ── Pool Lifecycle ──────────────────────────────────────────────

    #[test]
    fn single_thread_builds_no_pool() {
        assert!(!pooled(1).is_parallel());
        assert!(!ParallelMarker::sequential().is_parallel());
    }

    #[test]
    fn multi_thread_builds_pool() {
        let m = pooled(4);
        assert!(m.is_parallel());
        assert_eq!(m.threads().threads(), 4);
    }

    // ── Layout Equivalence ──────────────────────────────────────────

    #[test]
    fn dense_parallel_matches_sequential() {
        let limit = 50_000;
        for p in [2usize, 3, 7, 13, 101, 223] {
            let mut seq = vec![true; limit + 1];
            let mut par = vec![true; limit + 1];
            ParallelMarker::sequential().mark_flags(&mut seq, p);
            pooled(4).mark_flags(&mut par, p);
            assert_eq!(seq, par, "p = {}", p);
            assert!(seq[p], "p itself must stay a candidate");
            assert!(!seq[p * p]);
        }
    }

    #[test]
    fn packed_parallel_matches_sequential() {
        let limit = 50_000;
        for p in [2usize, 3, 5, 61, 67, 223] {
            let mut seq = BitStore::new(limit + 1).unwrap();
            let mut par = BitStore::new(limit + 1).unwrap();
            ParallelMarker::sequential().mark_bits(&mut seq, p, limit);
            pooled(4).mark_bits(&mut par, p, limit);
            let a: Vec<usize> = seq.iter_zeros().collect();
            let b: Vec<usize> = par.iter_zeros().collect();
            assert_eq!(a, b, "p = {}", p);
            let struck = (p * p..=limit).step_by(p).count();
            assert_eq!(seq.count_zeros(), limit + 1 - struck);
        }
    }

    #[test]
    fn wheel_parallel_matches_sequential() {
        let limit = 200_000u64;
        let len = wheel::count_up_to(limit);
        for p in [7u64, 11, 13, 31, 97, 443] {
            let mut seq = BitStore::new(len).unwrap();
            let mut par = BitStore::new(len).unwrap();
            ParallelMarker::sequential().mark_wheel(&mut seq, p, limit);
            pooled(4).mark_wheel(&mut par, p, limit);
            let a: Vec<usize> = seq.iter_zeros().collect();
            let b: Vec<usize> = par.iter_zeros().collect();
            assert_eq!(a, b, "p = {}", p);
        }
    }

    /// Every wheel number in range that is a multiple of p (from p² on) must
    /// be struck, and nothing else.
    #[test]
    fn wheel_strikes_exactly_the_multiples() {
        let limit = 10_000u64;
        let p = 7u64;
        let mut store = BitStore::new(wheel::count_up_to(limit)).unwrap();
        ParallelMarker::sequential().mark_wheel(&mut store, p, limit);
        for n in (7..=limit).filter(|&n| wheel::is_wheel_number(n)) {
            let expected = n % p == 0 && n >= p * p;
            assert_eq!(store.get(wheel::index_of(n)), expected, "n = {}", n);
        }
    }

    #[test]
    fn marking_past_limit_is_a_no_op() {
        let mut flags = vec![true; 50];
        ParallelMarker::sequential().mark_flags(&mut flags, 11);
        assert!(flags.iter().all(|&f| f));

        let mut store = BitStore::new(50).unwrap();
        pooled(2).mark_bits(&mut store, 11, 49);
        assert_eq!(store.count_zeros(), 50);
    }
}
