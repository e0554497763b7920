//! Byte-level adapter over the `binius_field` finite fields

use binius_field::underlier::WithUnderlier;
use binius_field::{AESTowerField8b, BinaryField16b, BinaryField8b, Field as BiniusField};

/// A finite field whose elements can be packed into symbol bytes.
///
/// Field arithmetic itself comes from `binius_field`; this trait only fixes
/// how an element is laid out in a byte buffer so that coefficient vectors and
/// symbol data share one representation.
pub trait SymbolField: BiniusField {
    /// Number of bytes occupied by one element
    const BYTES: usize;

    /// Read one element from the first `BYTES` bytes of `bytes`
    fn from_bytes(bytes: &[u8]) -> Self;

    /// Write this element into the first `BYTES` bytes of `out`
    fn write_bytes(self, out: &mut [u8]);
}

macro_rules! impl_symbol_field {
    ($field:ty, $underlier:ty) => {
        impl SymbolField for $field {
            const BYTES: usize = std::mem::size_of::<$underlier>();

            #[inline]
            fn from_bytes(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$underlier>()];
                raw.copy_from_slice(&bytes[..Self::BYTES]);
                <$field>::from_underlier(<$underlier>::from_le_bytes(raw))
            }

            #[inline]
            fn write_bytes(self, out: &mut [u8]) {
                out[..Self::BYTES].copy_from_slice(&self.to_underlier().to_le_bytes());
            }
        }
    };
}

impl_symbol_field!(AESTowerField8b, u8);
impl_symbol_field!(BinaryField8b, u8);
impl_symbol_field!(BinaryField16b, u16);
