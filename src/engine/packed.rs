//! Packed layout: one bit per number in `[0, limit]`, 64 per word.
//! Bit 1 = composite, so 0 and 1 are set at construction.

use crate::bit_store::BitStore;
use crate::engine::{run_generation, GenerationState, Sieve, SieveKind};
use crate::error::SieveError;
use crate::threads::ThreadConfig;
use crate::{isqrt, storage_len};

pub struct PackedSieve {
    bits: BitStore,
    limit: u64,
    threads: ThreadConfig,
    state: GenerationState,
}

impl PackedSieve {
    /// `threads = 0` auto-detects.
    pub fn new(limit: u64, threads: usize) -> Result<Self, SieveError> {
        PackedSieve::with_config(limit, ThreadConfig::resolve(threads))
    }

    pub fn with_config(limit: u64, threads: ThreadConfig) -> Result<Self, SieveError> {
        let len = storage_len(limit)?;
        let mut bits = BitStore::new(len)?;
        bits.set(0);
        if len > 1 {
            bits.set(1);
        }
        Ok(PackedSieve {
            bits,
            limit,
            threads,
            state: GenerationState::NotGenerated,
        })
    }

    /// Number of 64-bit storage words.
    pub fn word_count(&self) -> usize {
        self.bits.word_count()
    }
}

impl Sieve for PackedSieve {
    fn kind(&self) -> SieveKind {
        SieveKind::Packed
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn threads(&self) -> ThreadConfig {
        self.threads
    }

    fn state(&self) -> GenerationState {
        self.state
    }

    fn generate(&mut self) -> Result<(), SieveError> {
        let bits = &mut self.bits;
        let limit = self.limit as usize;
        let sqrt = isqrt(self.limit) as usize;
        run_generation(
            SieveKind::Packed,
            self.limit,
            self.threads,
            &mut self.state,
            |marker| {
                for p in 2..=sqrt {
                    if !bits.get(p) {
                        marker.mark_bits(bits, p, limit);
                    }
                }
            },
        )
    }

    fn memory_usage(&self) -> u64 {
        self.bits.memory_usage()
    }

    fn flag(&self, num: u64) -> bool {
        num <= self.limit && !self.bits.get(num as usize)
    }

    fn count_candidates(&self) -> u64 {
        self.bits.count_zeros() as u64
    }

    fn iter_primes(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(self.bits.iter_zeros().map(|n| n as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_set_at_construction() {
        let s = PackedSieve::new(100, 1).unwrap();
        assert!(!s.flag(0));
        assert!(!s.flag(1));
        assert!(s.flag(2));
        assert_eq!(s.count_candidates(), 99);
    }

    /// Bound 63, 64 and 127 put the last candidate on either side of a word
    /// boundary; the padding bits of the last word must never show up as
    /// primes.
    #[test]
    fn word_boundary_limits() {
        for (limit, pi) in [(63u64, 18u64), (64, 18), (127, 31), (128, 31)] {
            let mut s = PackedSieve::new(limit, 1).unwrap();
            assert_eq!(s.prime_count().unwrap(), pi, "limit {}", limit);
            let primes = s.primes().unwrap();
            assert!(primes.iter().all(|&p| p <= limit));
        }
    }

    #[test]
    fn memory_is_an_eighth_of_dense_rounded_to_words() {
        let s = PackedSieve::new(1_000_000, 1).unwrap();
        assert_eq!(s.word_count(), 15_626);
        assert_eq!(s.memory_usage(), 15_626 * 8);
    }

    /// Many threads with tiny limits: most strikes for small p land in words
    /// another worker is also writing.
    #[test]
    fn parallel_packed_has_no_lost_updates() {
        let mut seq = PackedSieve::new(300_007, 1).unwrap();
        let expected = seq.primes().unwrap();
        for threads in [2, 3, 8, 16] {
            let mut par = PackedSieve::new(300_007, threads).unwrap();
            assert_eq!(par.primes().unwrap(), expected, "x{}", threads);
        }
    }
}
