//! Dense layout: one `bool` per number in `[0, limit]`, `true` = candidate.

use crate::engine::{run_generation, GenerationState, Sieve, SieveKind};
use crate::error::SieveError;
use crate::threads::ThreadConfig;
use crate::{isqrt, storage_len, try_alloc};

pub struct DenseSieve {
    flags: Vec<bool>,
    limit: u64,
    threads: ThreadConfig,
    state: GenerationState,
}

impl DenseSieve {
    /// `threads = 0` auto-detects.
    pub fn new(limit: u64, threads: usize) -> Result<Self, SieveError> {
        DenseSieve::with_config(limit, ThreadConfig::resolve(threads))
    }

    pub fn with_config(limit: u64, threads: ThreadConfig) -> Result<Self, SieveError> {
        let len = storage_len(limit)?;
        let mut flags = try_alloc(len, || true)?;
        flags[0] = false;
        if len > 1 {
            flags[1] = false;
        }
        Ok(DenseSieve {
            flags,
            limit,
            threads,
            state: GenerationState::NotGenerated,
        })
    }
}

impl Sieve for DenseSieve {
    fn kind(&self) -> SieveKind {
        SieveKind::Dense
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
        let flags = &mut self.flags;
        let sqrt = isqrt(self.limit) as usize;
        run_generation(
            SieveKind::Dense,
            self.limit,
            self.threads,
            &mut self.state,
            |marker| {
                for p in 2..=sqrt {
                    if flags[p] {
                        marker.mark_flags(flags, p);
                    }
                }
            },
        )
    }

    fn memory_usage(&self) -> u64 {
        (self.flags.len() * std::mem::size_of::<bool>()) as u64
    }

    fn flag(&self, num: u64) -> bool {
        num <= self.limit && self.flags[num as usize]
    }

    fn count_candidates(&self) -> u64 {
        self.flags.iter().filter(|&&f| f).count() as u64
    }

    fn iter_primes(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new(
            self.flags
                .iter()
                .enumerate()
                .filter_map(|(n, &f)| f.then_some(n as u64)),
        )
    }
}
