//! # Wheel — Mod-30 Index Mapping
//!
//! Bijection between the numbers ≥ 7 coprime to 30 = 2·3·5 and the dense
//! index space `0, 1, 2, …`. Every block of 30 consecutive integers starting
//! at 7 holds exactly 8 such numbers (7, 11, 13, 17, 19, 23, 29, 31 and their
//! translates), so a wheel sieve stores 8/30 ≈ 26.7% of the candidates a
//! dense sieve does.
//!
//! ```text
//! n      7  11  13  17  19  23  29  31  37  41 …
//! index  0   1   2   3   4   5   6   7   8   9 …
//! ```
//!
//! `index_of(n) = (n - 7) / 30 * 8 + position((n - 7) % 30)` and
//! `number_at(i) = 7 + (i / 8) * 30 + OFFSETS[i % 8]`.

/// Wheel modulus 2·3·5.
pub const MODULUS: u64 = 30;

/// Wheel numbers per block of 30.
pub const SPOKES: usize = 8;

/// First wheel number; 2, 3 and 5 live outside the wheel.
pub const FIRST: u64 = 7;

/// Offsets of the wheel numbers from the start of a block (7 + 30k).
const OFFSETS: [u64; SPOKES] = [0, 4, 6, 10, 12, 16, 22, 24];

/// Map `(n - 7) % 30` → position in the block (255 = not coprime to 30).
const POSITION: [u8; 30] = [
    0, 255, 255, 255, 1, 255, 2, 255, 255, 255, 3, 255, 4, 255, 255, 255, 5, 255, 255, 255, 255,
    255, 6, 255, 7, 255, 255, 255, 255, 255,
];

/// Distance from `7 + r` to the next wheel number, indexed by `r = (n - 7) % 30`.
/// On wheel numbers this is the gap cycle 4, 2, 4, 2, 4, 6, 2, 6.
const SKIP: [u64; 30] = [
    4, 3, 2, 1, 2, 1, 4, 3, 2, 1, 2, 1, 4, 3, 2, 1, 6, 5, 4, 3, 2, 1, 2, 1, 6, 5, 4, 3, 2, 1,
];

/// Number of wheel offsets `<= r`, indexed by `r = (n - 7) % 30`.
const COUNT_UPTO: [u8; 30] = [
    1, 1, 1, 1, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 7, 7, 8, 8, 8, 8, 8, 8,
];

/// True if `n >= 7` and `n` shares no factor with 30.
#[inline]
pub fn is_wheel_number(n: u64) -> bool {
    n >= FIRST && POSITION[((n - FIRST) % MODULUS) as usize] != 255
}

/// Compressed index of a wheel number. `n` must satisfy [`is_wheel_number`].
#[inline]
pub fn index_of(n: u64) -> usize {
    debug_assert!(is_wheel_number(n), "{} is not a wheel number", n);
    let offset = n - FIRST;
    (offset / MODULUS) as usize * SPOKES + POSITION[(offset % MODULUS) as usize] as usize
}

/// Checked variant of [`index_of`]: `None` for n < 7 or n divisible by 2, 3 or 5.
pub fn try_index(n: u64) -> Option<usize> {
    is_wheel_number(n).then(|| index_of(n))
}

/// Inverse of [`index_of`].
#[inline]
pub fn number_at(index: usize) -> u64 {
    FIRST + (index / SPOKES) as u64 * MODULUS + OFFSETS[index % SPOKES]
}

/// Smallest number greater than `n` that is not divisible by 2, 3 or 5.
///
/// Below the wheel the sequence is the base primes themselves: 2, 3, 5, 7.
#[inline]
pub fn next(n: u64) -> u64 {
    match n {
        0 | 1 => 2,
        2 => 3,
        3 | 4 => 5,
        5 | 6 => FIRST,
        _ => n + SKIP[((n - FIRST) % MODULUS) as usize],
    }
}

/// Number of wheel numbers in `[7, limit]`, i.e. the compressed array length.
pub fn count_up_to(limit: u64) -> usize {
    if limit < FIRST {
        return 0;
    }
    let offset = limit - FIRST;
    (offset / MODULUS) as usize * SPOKES + COUNT_UPTO[(offset % MODULUS) as usize] as usize
}
