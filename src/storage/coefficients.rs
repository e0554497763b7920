//! Coefficient vectors: one field element per symbol slot of a generation

use crate::coding::traits::CodingError;
use crate::storage::SymbolField;
use std::ops::{Index, IndexMut};

/// Fixed-length sequence of field elements, `coefficients[i]` weighting
/// source symbol `i`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoefficientVector<F: SymbolField> {
    values: Vec<F>,
}

impl<F: SymbolField> CoefficientVector<F> {
    /// All-zero vector over `symbols` slots
    pub fn zero(symbols: usize) -> Self {
        Self {
            values: vec![F::ZERO; symbols],
        }
    }

    /// Unit vector selecting source symbol `index`
    pub fn unit(symbols: usize, index: usize) -> Self {
        debug_assert!(index < symbols);
        let mut vector = Self::zero(symbols);
        vector.values[index] = F::ONE;
        vector
    }

    /// Wrap existing coefficients
    pub fn from_values(values: Vec<F>) -> Self {
        Self { values }
    }

    /// Number of bytes needed to pack `symbols` coefficients
    pub fn packed_size(symbols: usize) -> usize {
        symbols * F::BYTES
    }

    /// Unpack `symbols` coefficients from the front of `bytes`
    pub fn unpack(bytes: &[u8], symbols: usize) -> Result<Self, CodingError> {
        let mut vector = Self::zero(symbols);
        vector.unpack_into(bytes)?;
        Ok(vector)
    }

    /// Overwrite every slot from the front of `bytes`, keeping the length.
    /// Returns the number of bytes read.
    pub fn unpack_into(&mut self, bytes: &[u8]) -> Result<usize, CodingError> {
        let size = Self::packed_size(self.len());
        if bytes.len() < size {
            return Err(CodingError::InvalidPacketFormat);
        }
        for (slot, chunk) in self.values.iter_mut().zip(bytes.chunks_exact(F::BYTES)) {
            *slot = F::from_bytes(chunk);
        }
        Ok(size)
    }

    /// Pack into the front of `out`, returning the number of bytes written
    pub fn pack(&self, out: &mut [u8]) -> Result<usize, CodingError> {
        let size = Self::packed_size(self.len());
        if out.len() < size {
            return Err(CodingError::BufferTooSmall);
        }
        for (value, chunk) in self.values.iter().zip(out.chunks_exact_mut(F::BYTES)) {
            value.write_bytes(chunk);
        }
        Ok(size)
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every coefficient is zero
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|c| c.is_zero())
    }

    /// Lowest-indexed nonzero coefficient
    pub fn leading(&self) -> Option<(usize, F)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_zero())
            .map(|(i, c)| (i, *c))
    }

    /// Number of nonzero coefficients
    pub fn degree(&self) -> usize {
        self.values.iter().filter(|c| !c.is_zero()).count()
    }

    /// Reset every slot to zero
    pub fn clear(&mut self) {
        self.values.fill(F::ZERO);
    }

    /// Resize to `symbols` slots, zeroing everything
    pub fn reset(&mut self, symbols: usize) {
        self.values.clear();
        self.values.resize(symbols, F::ZERO);
    }

    /// View the coefficients
    pub fn as_slice(&self) -> &[F] {
        &self.values
    }

    /// Mutable view of the coefficients
    pub fn as_mut_slice(&mut self) -> &mut [F] {
        &mut self.values
    }

    /// Consume into the raw coefficients
    pub fn into_inner(self) -> Vec<F> {
        self.values
    }
}

impl<F: SymbolField> Index<usize> for CoefficientVector<F> {
    type Output = F;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl<F: SymbolField> IndexMut<usize> for CoefficientVector<F> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl<F: SymbolField> From<Vec<F>> for CoefficientVector<F> {
    fn from(values: Vec<F>) -> Self {
        Self::from_values(values)
    }
}

impl<F: SymbolField> AsRef<[F]> for CoefficientVector<F> {
    fn as_ref(&self) -> &[F] {
        &self.values
    }
}
