//! Coder configuration: which optional behaviours a coder carries

use crate::coding::sparse::SparseConfig;
use crate::coding::traits::CodingError;
use crate::storage::SymbolField;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a packet identifies its coefficient vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SymbolId {
    /// The packed coefficient vector travels with every packet
    #[default]
    Plain,
    /// A 4-byte seed travels instead; the receiver regenerates the vector.
    /// Per-packet seeds count up from `base_seed`.
    Seed {
        /// First seed used after `configure`
        base_seed: u32,
    },
}

/// Distribution of freshly drawn coefficients
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeneratorKind {
    /// Every slot uniform over the whole field, zero included
    #[default]
    Uniform,
    /// A bounded number of nonzero slots
    Sparse(SparseConfig),
    /// A unit pivot at a random slot followed by `width` uniform slots,
    /// wrapping past the last symbol
    Perpetual {
        /// Slots drawn after the pivot
        width: usize,
    },
}

/// Payload appended to the pivot bitmap in feedback messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeedbackExtension {
    /// Decoder rank as a 4-byte big-endian integer
    Rank,
}

impl FeedbackExtension {
    /// Serialized size of the extension
    pub fn size(&self) -> usize {
        match self {
            FeedbackExtension::Rank => std::mem::size_of::<u32>(),
        }
    }
}

/// Optional coder behaviours, fixed at construction
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoderConfig {
    /// Send every source symbol uncoded before coded packets
    pub systematic: bool,
    /// Packet identifier format
    pub symbol_id: SymbolId,
    /// Coefficient distribution
    pub generator: GeneratorKind,
    /// Steer coefficients and systematic packets by downstream feedback
    pub status_aware: bool,
    /// Allow decoders to emit recoded packets
    pub recoding: bool,
    /// Extensions written after the pivot bitmap, in order
    pub feedback_extensions: Vec<FeedbackExtension>,
    /// Fixed key for the coefficient RNG; entropy when unset
    pub rng_seed: Option<[u8; 32]>,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            systematic: true,
            symbol_id: SymbolId::Plain,
            generator: GeneratorKind::Uniform,
            status_aware: false,
            recoding: false,
            feedback_extensions: Vec::new(),
            rng_seed: None,
        }
    }
}

impl CoderConfig {
    /// Enable or disable the systematic phase
    pub fn with_systematic(mut self, systematic: bool) -> Self {
        self.systematic = systematic;
        self
    }

    /// Identify packets by seed instead of coefficient vector
    pub fn with_seed_ids(mut self, base_seed: u32) -> Self {
        self.symbol_id = SymbolId::Seed { base_seed };
        self
    }

    /// Draw sparse coefficients
    pub fn with_sparse(mut self, sparse: SparseConfig) -> Self {
        self.generator = GeneratorKind::Sparse(sparse);
        self
    }

    /// Draw perpetual (banded) coefficients
    pub fn with_perpetual(mut self, width: usize) -> Self {
        self.generator = GeneratorKind::Perpetual { width };
        self
    }

    /// Steer generation by downstream feedback
    pub fn with_status_awareness(mut self, status_aware: bool) -> Self {
        self.status_aware = status_aware;
        self
    }

    /// Allow decoders to recode
    pub fn with_recoding(mut self, recoding: bool) -> Self {
        self.recoding = recoding;
        self
    }

    /// Append a feedback extension
    pub fn with_feedback_extension(mut self, extension: FeedbackExtension) -> Self {
        self.feedback_extensions.push(extension);
        self
    }

    /// Use a fixed RNG key
    pub fn with_rng_seed(mut self, seed: [u8; 32]) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Whether packets carry seeds
    pub fn uses_seed_ids(&self) -> bool {
        matches!(self.symbol_id, SymbolId::Seed { .. })
    }

    /// Reject feature combinations that cannot work together.
    ///
    /// A seed only reproduces a vector drawn over the full generation, so
    /// seeded identifiers exclude status-aware generation and recoding.
    pub fn validate(&self) -> Result<(), CodingError> {
        match &self.generator {
            GeneratorKind::Sparse(sparse) if !sparse.is_valid() => {
                return Err(CodingError::InvalidParameters);
            }
            GeneratorKind::Perpetual { width: 0 } => return Err(CodingError::InvalidParameters),
            _ => {}
        }
        if self.uses_seed_ids() && (self.status_aware || self.recoding) {
            return Err(CodingError::InvalidParameters);
        }
        Ok(())
    }

    /// Total bytes of the configured feedback extensions
    pub fn feedback_extensions_size(&self) -> usize {
        self.feedback_extensions.iter().map(|ext| ext.size()).sum()
    }

    /// Identifier size for a generation of `symbols` over `F`
    pub fn id_size<F: SymbolField>(&self, symbols: usize) -> usize {
        match self.symbol_id {
            SymbolId::Plain => symbols * F::BYTES,
            SymbolId::Seed { .. } => crate::coding::payload::SEED_SIZE,
        }
    }
}

/// Upper bounds a coder was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Limits {
    pub max_symbols: usize,
    pub max_symbol_size: usize,
}

impl Limits {
    pub const UNBOUNDED: Limits = Limits {
        max_symbols: usize::MAX,
        max_symbol_size: usize::MAX,
    };

    /// Validate generation dimensions against the bounds and field width
    pub fn check<F: SymbolField>(
        &self,
        symbols: usize,
        symbol_size: usize,
    ) -> Result<(), CodingError> {
        if symbols == 0 || symbol_size == 0 {
            return Err(CodingError::InvalidParameters);
        }
        if symbols > self.max_symbols || symbol_size > self.max_symbol_size {
            return Err(CodingError::InvalidParameters);
        }
        if symbol_size % F::BYTES != 0 {
            return Err(CodingError::InvalidSymbolSize);
        }
        Ok(())
    }
}
