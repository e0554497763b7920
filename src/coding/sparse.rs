//! Sparse coefficient generation for RLNC with configurable sparsity levels

use crate::storage::SymbolField;
use crate::utils::CodingRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for sparse coefficient generation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseConfig {
    /// Target sparsity level (0.0 = all zeros, 1.0 = all non-zeros)
    pub sparsity: f64,
    /// Maximum number of non-zero coefficients
    pub max_non_zeros: Option<usize>,
    /// Minimum number of non-zero coefficients
    pub min_non_zeros: usize,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            sparsity: 1.0, // Full density by default
            max_non_zeros: None,
            min_non_zeros: 1,
        }
    }
}

impl SparseConfig {
    /// Create a new sparse configuration with specified sparsity
    pub fn new(sparsity: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&sparsity),
            "Sparsity must be between 0.0 and 1.0"
        );
        Self {
            sparsity,
            ..Default::default()
        }
    }

    /// Set maximum non-zero coefficients
    pub fn with_max_non_zeros(mut self, max: usize) -> Self {
        self.max_non_zeros = Some(max);
        self
    }

    /// Set minimum non-zero coefficients
    pub fn with_min_non_zeros(mut self, min: usize) -> Self {
        self.min_non_zeros = min;
        self
    }

    /// Whether the configuration describes a usable generator
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.sparsity)
            && self.max_non_zeros.map_or(true, |max| max >= self.min_non_zeros)
    }

    /// Calculate actual number of non-zero coefficients for given symbols
    pub fn calculate_non_zeros(&self, symbols: usize) -> usize {
        let target = (symbols as f64 * self.sparsity).round() as usize;
        let actual = target.max(self.min_non_zeros);

        if let Some(max) = self.max_non_zeros {
            actual.min(max).min(symbols)
        } else {
            actual.min(symbols)
        }
    }
}

/// Fill `out` with sparse coefficients restricted to `positions`.
///
/// Slots outside `positions` are left untouched; callers hand in a zeroed
/// vector. The chosen slots always receive nonzero values.
pub(crate) fn fill_sparse<F: SymbolField>(
    rng: &mut CodingRng,
    config: &SparseConfig,
    positions: &mut [usize],
    out: &mut [F],
) {
    let non_zeros = config.calculate_non_zeros(positions.len());
    if non_zeros == 0 {
        return;
    }

    rng.shuffle(positions);
    for &pos in positions.iter().take(non_zeros) {
        out[pos] = rng.generate_nonzero_coefficient();
    }
}
