//! Optimal bloom filter parameter calculation
//!
//! Formulas:
//! - m = -n*ln(fpr) / (ln(2)^2)  -- optimal bits
//! - k = (m/n) * ln(2)           -- optimal hash functions
//! - FPR = (1 - e^(-kn/m))^k

use std::f64::consts::LN_2;

/// Bloom filter sizing.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter
    pub size_bits: usize,
    /// Number of hash functions
    pub hash_count: usize,
    /// Expected false positive rate at the projected element count
    pub expected_fpr: f64,
}

/// Calculate optimal parameters for `num_elements` at `target_fpr`.
pub fn calculate_optimal_parameters(num_elements: usize, target_fpr: f64) -> BloomFilterParams {
    if num_elements == 0 {
        return BloomFilterParams {
            size_bits: 1,
            hash_count: 1,
            expected_fpr: 1.0,
        };
    }

    let n = num_elements as f64;
    let m = (-n * target_fpr.ln() / (LN_2 * LN_2)).ceil() as usize;
    let k = optimal_k(m, num_elements);

    BloomFilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: calculate_fpr(m, num_elements, k),
    }
}

/// Optimal parameters, with the bit array never larger than `max_bits`.
///
/// When the cap binds, `k` is re-derived for the smaller array and the
/// expected FPR rises accordingly.
pub fn capped_parameters(
    num_elements: usize,
    target_fpr: f64,
    max_bits: usize,
) -> BloomFilterParams {
    let params = calculate_optimal_parameters(num_elements, target_fpr);
    if params.size_bits <= max_bits {
        return params;
    }

    let size_bits = max_bits.max(1);
    let hash_count = optimal_k(size_bits, num_elements);
    BloomFilterParams {
        size_bits,
        hash_count,
        expected_fpr: calculate_fpr(size_bits, num_elements, hash_count),
    }
}

/// Calculate the false positive rate for given parameters
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

/// Optimal k for given m and n, clamped to `1..=32`.
pub fn optimal_k(m: usize, n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let k = ((m as f64 / n as f64) * LN_2).round() as usize;
    k.clamp(1, 32)
}
