//! # BitStore — Packed u64 Bitmap with Atomic Words
//!
//! Fixed-size bit storage over indices `[0, len)`, 64 bits per word. A set
//! bit means "composite", a clear bit means "still a prime candidate", so a
//! freshly allocated store has every index as a candidate.
//!
//! ## Addressing
//!
//! `word = index / 64`, `bit = index % 64`. There is no bounds checking beyond
//! `debug_assert!`: the engines own the bound and keep every index below it.
//!
//! ## Concurrent Writers
//!
//! Words are `AtomicU64`. Exclusive (`&mut self`) writes go through
//! `get_mut()` and compile to plain loads and stores. Parallel marking uses
//! [`BitStore::set_shared`], a single `fetch_or` on the containing word, so
//! two workers striking different bits of the same word never lose an
//! update. `Relaxed` ordering is enough: the rayon join at the end of each
//! dispatch publishes every write before the next read.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SieveError;
use crate::try_alloc;

/// Bits per storage word.
pub const WORD_BITS: usize = 64;

const WORD_BYTES: usize = std::mem::size_of::<u64>();

pub struct BitStore {
    words: Vec<AtomicU64>,
    len: usize,
}

impl BitStore {
    /// Allocate a store of `len` bits, all clear.
    pub fn new(len: usize) -> Result<Self, SieveError> {
        let num_words = len.div_ceil(WORD_BITS);
        let words = try_alloc(num_words, || AtomicU64::new(0))?;
        Ok(BitStore { words, len })
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Storage footprint in bytes: `ceil(len / 64) * 8`.
    pub fn memory_usage(&self) -> u64 {
        (self.words.len() * WORD_BYTES) as u64
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "BitStore index out of bounds: {} >= {}",
            index,
            self.len
        );
        let word = self.words[index / WORD_BITS].load(Ordering::Relaxed);
        word & (1u64 << (index % WORD_BITS)) != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        *self.words[index / WORD_BITS].get_mut() |= 1u64 << (index % WORD_BITS);
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        *self.words[index / WORD_BITS].get_mut() &= !(1u64 << (index % WORD_BITS));
    }

    /// Set bit `index` through a shared reference. Safe to call from many
    /// workers at once, including on indices that share a word.
    #[inline]
    pub fn set_shared(&self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / WORD_BITS].fetch_or(1u64 << (index % WORD_BITS), Ordering::Relaxed);
    }

    /// Mask of the bits of word `wi` that lie inside `[0, len)`.
    #[inline]
    fn valid_mask(&self, wi: usize) -> u64 {
        let tail = self.len % WORD_BITS;
        if wi + 1 == self.words.len() && tail != 0 {
            (1u64 << tail) - 1
        } else {
            u64::MAX
        }
    }

    /// Count the clear bits (surviving candidates) using hardware POPCNT.
    pub fn count_zeros(&self) -> usize {
        self.words
            .iter()
            .enumerate()
            .map(|(wi, w)| (!w.load(Ordering::Relaxed) & self.valid_mask(wi)).count_ones() as usize)
            .sum()
    }

    /// Iterate over the indices of all clear bits in ascending order.
    pub fn iter_zeros(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(move |(wi, w)| BitIter {
            word: !w.load(Ordering::Relaxed) & self.valid_mask(wi),
            base: wi * WORD_BITS,
        })
    }
}

/// Iterator over set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: usize,
}

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}
