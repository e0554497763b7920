use crate::storage::SymbolField;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random number generator wrapper for network coding
#[derive(Debug, Clone)]
pub struct CodingRng {
    rng: ChaCha8Rng,
}

impl CodingRng {
    /// Create a new RNG with a random seed
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a new RNG with a specific seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Create a new RNG keyed by a packet seed.
    ///
    /// Every party expanding the same `seed` observes the same stream.
    pub fn from_packet_seed(seed: u32) -> Self {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[..4].copy_from_slice(&seed.to_le_bytes());
        Self::from_seed(seed_bytes)
    }

    /// Generate a single uniformly random field element (possibly zero)
    pub fn generate_coefficient<F: SymbolField>(&mut self) -> F {
        let mut bytes = [0u8; 16];
        let bytes = &mut bytes[..F::BYTES];
        self.rng.fill(bytes);
        F::from_bytes(bytes)
    }

    /// Generate a uniformly random nonzero field element
    pub fn generate_nonzero_coefficient<F: SymbolField>(&mut self) -> F {
        loop {
            let coefficient = self.generate_coefficient::<F>();
            if !coefficient.is_zero() {
                return coefficient;
            }
        }
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.rng);
    }

    /// Uniform index in `[0, bound)`; `bound` must be nonzero
    pub fn generate_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

impl Default for CodingRng {
    fn default() -> Self {
        Self::new()
    }
}
