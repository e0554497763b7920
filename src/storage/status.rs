//! Per-symbol status bitmaps (pivot status, symbol availability)

use crate::coding::traits::CodingError;
use bitvec::prelude::{BitVec, Lsb0};

/// One bit per symbol index of a generation.
///
/// Serialized as `ceil(len / 8)` bytes, bit `i` living in byte `i / 8` at
/// position `i % 8` counted from the least significant bit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusBitmap {
    bits: BitVec<u8, Lsb0>,
}

impl StatusBitmap {
    /// All-clear bitmap over `len` symbols
    pub fn new(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, len),
        }
    }

    /// Serialized size of a bitmap over `len` symbols
    pub fn size_for(len: usize) -> usize {
        len.div_ceil(8)
    }

    /// Serialized size of this bitmap
    pub fn serialized_size(&self) -> usize {
        Self::size_for(self.len())
    }

    /// Number of indices covered
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the bitmap covers no indices
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Clear all bits and resize to `len`
    pub fn reset(&mut self, len: usize) {
        self.bits.clear();
        self.bits.resize(len, false);
    }

    /// Clear all bits, keeping the length
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Test bit `index`; out-of-range indices read as clear
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).map(|bit| *bit).unwrap_or(false)
    }

    /// Set bit `index`
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len());
        self.bits.set(index, true);
    }

    /// Clear bit `index`
    #[inline]
    pub fn unset(&mut self, index: usize) {
        debug_assert!(index < self.len());
        self.bits.set(index, false);
    }

    /// Number of set bits
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether every index is set
    pub fn all(&self) -> bool {
        self.bits.all()
    }

    /// Whether any index is set
    pub fn any(&self) -> bool {
        self.bits.any()
    }

    /// Indices of the set bits in increasing order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Write the bitmap, returning the number of bytes written
    pub fn write(&self, out: &mut [u8]) -> Result<usize, CodingError> {
        let size = self.serialized_size();
        if out.len() < size {
            return Err(CodingError::BufferTooSmall);
        }
        out[..size].copy_from_slice(self.bits.as_raw_slice());
        let tail = self.len() % 8;
        if tail != 0 {
            out[size - 1] &= (1u8 << tail) - 1;
        }
        Ok(size)
    }

    /// Replace the bitmap contents from `input`, keeping the current length.
    /// Padding bits past the length are ignored.
    pub fn read(&mut self, input: &[u8]) -> Result<usize, CodingError> {
        let len = self.len();
        let size = self.serialized_size();
        if input.len() < size {
            return Err(CodingError::InvalidPacketFormat);
        }
        let mut bits = BitVec::<u8, Lsb0>::from_slice(&input[..size]);
        bits.truncate(len);
        self.bits = bits;
        Ok(size)
    }
}
