use crate::storage::SymbolField;
use std::ops::{Index, IndexMut};

/// A symbol is a fixed-size chunk of data in a network coding context
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Symbol {
    data: Vec<u8>,
}

impl Symbol {
    /// Create a zero symbol of `len` bytes
    pub fn zero(len: usize) -> Self {
        Self { data: vec![0u8; len] }
    }

    /// Create a new symbol from existing data
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create a symbol by copying a slice
    pub fn from_slice(slice: &[u8]) -> Self {
        Self {
            data: slice.to_vec(),
        }
    }

    /// Size of the symbol in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the symbol holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get the underlying data as a mutable slice
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the underlying data
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Add another symbol to this one element-wise in `F`
    pub fn add_assign<F: SymbolField>(&mut self, other: &Self) {
        add_assign::<F>(&mut self.data, &other.data);
    }

    /// Scale this symbol by a field element
    pub fn scale<F: SymbolField>(&mut self, scalar: F) {
        scale(&mut self.data, scalar);
    }
}

impl Index<usize> for Symbol {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for Symbol {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl From<Vec<u8>> for Symbol {
    fn from(data: Vec<u8>) -> Self {
        Self::from_data(data)
    }
}

impl From<Symbol> for Vec<u8> {
    fn from(symbol: Symbol) -> Self {
        symbol.into_inner()
    }
}

impl AsRef<[u8]> for Symbol {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsMut<[u8]> for Symbol {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

// Slice kernels shared by the encoder, the elimination engine and the
// recoder. Buffers hold packed `F` elements, so lengths must be multiples
// of `F::BYTES`.

/// `dst += src`
#[inline]
pub fn add_assign<F: SymbolField>(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst
        .chunks_exact_mut(F::BYTES)
        .zip(src.chunks_exact(F::BYTES))
    {
        let sum = F::from_bytes(d) + F::from_bytes(s);
        sum.write_bytes(d);
    }
}

/// `dst *= scalar`
#[inline]
pub fn scale<F: SymbolField>(dst: &mut [u8], scalar: F) {
    if scalar.is_zero() {
        dst.fill(0);
        return;
    }
    if scalar == F::ONE {
        return;
    }
    for d in dst.chunks_exact_mut(F::BYTES) {
        let value = F::from_bytes(d);
        if value.is_zero() {
            continue;
        }
        (value * scalar).write_bytes(d);
    }
}

/// `dst += scalar * src`
#[inline]
pub fn add_scaled<F: SymbolField>(dst: &mut [u8], src: &[u8], scalar: F) {
    debug_assert_eq!(dst.len(), src.len());
    if scalar.is_zero() {
        return;
    }
    for (d, s) in dst
        .chunks_exact_mut(F::BYTES)
        .zip(src.chunks_exact(F::BYTES))
    {
        let value = F::from_bytes(s);
        if value.is_zero() {
            continue;
        }
        (F::from_bytes(d) + value * scalar).write_bytes(d);
    }
}

/// `dst -= scalar * src`
#[inline]
pub fn subtract_scaled<F: SymbolField>(dst: &mut [u8], src: &[u8], scalar: F) {
    debug_assert_eq!(dst.len(), src.len());
    if scalar.is_zero() {
        return;
    }
    for (d, s) in dst
        .chunks_exact_mut(F::BYTES)
        .zip(src.chunks_exact(F::BYTES))
    {
        let value = F::from_bytes(s);
        if value.is_zero() {
            continue;
        }
        (F::from_bytes(d) - value * scalar).write_bytes(d);
    }
}
