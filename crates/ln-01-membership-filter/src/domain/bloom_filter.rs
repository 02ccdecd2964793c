//! Core bloom filter implementation
//!
//! INVARIANTS:
//! - Bounded FPR: FPR = (1 - e^(-kn/m))^k, bounded by the configured target
//!   while the element count stays at or below the projection
//! - No false negatives: if inserted, contains() MUST return true

use bitvec::prelude::*;

use super::config::FilterParameters;
use super::hash_functions::hash_positions;
use super::parameters::{calculate_fpr, calculate_optimal_parameters};

/// Bloom filter for probabilistic membership testing
///
/// False positives are possible, false negatives are not. Elements are
/// arbitrary byte strings; callers decide how ids, keys and addresses are
/// encoded.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Size in bits (m)
    m: usize,
    /// Number of insertions (n)
    n: usize,
}

impl BloomFilter {
    /// Create a new bloom filter with `m` bits and `k` hash functions
    pub fn new(m: usize, k: usize) -> Self {
        let m = m.max(1);
        Self {
            bits: bitvec![u8, Lsb0; 0; m],
            k: k.max(1),
            m,
            n: 0,
        }
    }

    /// Create a filter with optimal (uncapped) parameters for a target FPR
    pub fn new_with_fpr(expected_elements: usize, target_fpr: f64) -> Self {
        let params = calculate_optimal_parameters(expected_elements, target_fpr);
        Self::new(params.size_bits, params.hash_count)
    }

    /// Create a filter sized by `params`, honoring its size cap
    pub fn with_parameters(params: &FilterParameters) -> Self {
        let sizing = params.sizing();
        tracing::trace!(
            size_bits = sizing.size_bits,
            hash_count = sizing.hash_count,
            expected_fpr = sizing.expected_fpr,
            "Allocating membership filter"
        );
        Self::new(sizing.size_bits, sizing.hash_count)
    }

    /// Insert an element into the filter
    ///
    /// After insertion, `contains(element)` is guaranteed to return true.
    pub fn insert(&mut self, element: &[u8]) {
        for pos in hash_positions(element, self.k, self.m) {
            self.bits.set(pos, true);
        }
        self.n += 1;
    }

    /// Test if an element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set
    pub fn contains(&self, element: &[u8]) -> bool {
        let mut positions = hash_positions(element, self.k, self.m);
        positions.all(|pos| self.bits[pos])
    }

    /// Current false positive rate estimate
    pub fn false_positive_rate(&self) -> f64 {
        calculate_fpr(self.m, self.n, self.k)
    }

    /// Number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn size_bits(&self) -> usize {
        self.m
    }

    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Number of insertions, duplicates included
    pub fn elements_inserted(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Reset all bits to 0
    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.n = 0;
    }
}
