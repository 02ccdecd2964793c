//! Hash functions for the membership filter
//!
//! Uses MurmurHash3 (x64, 128-bit) with two seeds and derives the remaining
//! positions by double hashing.

use std::io::Cursor;

/// Hash an element with MurmurHash3 using `seed`, keeping the lower 64 bits.
pub fn murmur_hash(element: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    hash as u64
}

/// Bit positions probed for `element` in a filter of `m` bits with `k` hashes.
///
/// Double hashing: `h(i) = h1 + i * h2 (mod m)`. Returned lazily so probing
/// does not allocate.
pub fn hash_positions(element: &[u8], k: usize, m: usize) -> impl Iterator<Item = usize> {
    let h1 = murmur_hash(element, 0);
    let h2 = murmur_hash(element, 1);
    let m = m.max(1) as u64;

    (0..k).map(move |i| {
        let hash = h1.wrapping_add((i as u64).wrapping_mul(h2));
        (hash % m) as usize
    })
}
