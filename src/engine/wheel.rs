//! Wheel layout: only numbers ≥ 7 coprime to 30 get a storage bit, addressed
//! through [`crate::wheel`]. 2, 3 and 5 are prime constants outside the
//! array; every other multiple of 2, 3 or 5 (and 0, 1) has no slot and
//! reads as composite.

use crate::bit_store::BitStore;
use crate::engine::{run_generation, GenerationState, Sieve, SieveKind};
use crate::error::SieveError;
use crate::threads::ThreadConfig;
use crate::{isqrt, wheel};

/// Primes handled outside the compressed array.
const BASE_PRIMES: [u64; 3] = [2, 3, 5];

pub struct WheelSieve {
    bits: BitStore,
    limit: u64,
    threads: ThreadConfig,
    state: GenerationState,
}

impl WheelSieve {
    /// `threads = 0` auto-detects.
    pub fn new(limit: u64, threads: usize) -> Result<Self, SieveError> {
        WheelSieve::with_config(limit, ThreadConfig::resolve(threads))
    }

    pub fn with_config(limit: u64, threads: ThreadConfig) -> Result<Self, SieveError> {
        let bits = BitStore::new(wheel::count_up_to(limit))?;
        Ok(WheelSieve {
            bits,
            limit,
            threads,
            state: GenerationState::NotGenerated,
        })
    }

    /// Length of the compressed array.
    pub fn slots(&self) -> usize {
        self.bits.len()
    }

    fn base_primes(&self) -> impl Iterator<Item = u64> + '_ {
        BASE_PRIMES.iter().copied().filter(move |&p| p <= self.limit)
    }
}

impl Sieve for WheelSieve {
    fn kind(&self) -> SieveKind {
        SieveKind::Wheel
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
        let limit = self.limit;
        let sqrt = isqrt(limit);
        run_generation(
            SieveKind::Wheel,
            limit,
            self.threads,
            &mut self.state,
            |marker| {
                let mut p = wheel::FIRST;
                while p <= sqrt {
                    if !bits.get(wheel::index_of(p)) {
                        marker.mark_wheel(bits, p, limit);
                    }
                    p = wheel::next(p);
                }
            },
        )
    }

    fn memory_usage(&self) -> u64 {
        self.bits.memory_usage()
    }

    fn flag(&self, num: u64) -> bool {
        if num > self.limit {
            return false;
        }
        match num {
            2 | 3 | 5 => true,
            n => wheel::try_index(n).is_some_and(|i| !self.bits.get(i)),
        }
    }

    fn count_candidates(&self) -> u64 {
        self.base_primes().count() as u64 + self.bits.count_zeros() as u64
    }

    fn iter_primes(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(
            self.base_primes()
                .chain(self.bits.iter_zeros().map(wheel::number_at)),
        )
    }
}
