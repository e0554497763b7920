//! Packet identifier layout: `[identifier][data]`
//!
//! Plain identifiers are packed coefficient vectors; systematic packets carry
//! a unit vector, so no extra framing is needed. Seed identifiers are a 4-byte
//! big-endian integer. Coded packets use seeds below `2^31`, systematic packets
//! set the top bit and carry the source symbol index in the remaining bits.

use crate::coding::traits::CodingError;

/// Bytes used by a seed identifier
pub const SEED_SIZE: usize = std::mem::size_of::<u32>();

/// Top bit of a seed identifier marking an uncoded symbol
pub const SYSTEMATIC_SEED_FLAG: u32 = 0x8000_0000;

/// Seeds of coded packets live below the systematic flag
pub const SEED_MASK: u32 = !SYSTEMATIC_SEED_FLAG;

/// A decoded seed identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedId {
    /// Coefficients regenerate from this seed
    Coded(u32),
    /// Uncoded source symbol at this index
    Systematic(usize),
}

impl SeedId {
    /// Write the identifier, returning the bytes written
    pub fn write(&self, out: &mut [u8]) -> Result<usize, CodingError> {
        if out.len() < SEED_SIZE {
            return Err(CodingError::BufferTooSmall);
        }
        let raw = match *self {
            SeedId::Coded(seed) => {
                debug_assert_eq!(seed & SYSTEMATIC_SEED_FLAG, 0);
                seed & SEED_MASK
            }
            SeedId::Systematic(index) => {
                let index = u32::try_from(index).map_err(|_| CodingError::InvalidParameters)?;
                if index & SYSTEMATIC_SEED_FLAG != 0 {
                    return Err(CodingError::InvalidParameters);
                }
                SYSTEMATIC_SEED_FLAG | index
            }
        };
        out[..SEED_SIZE].copy_from_slice(&raw.to_be_bytes());
        Ok(SEED_SIZE)
    }

    /// Read an identifier from the front of `input`
    pub fn read(input: &[u8]) -> Result<Self, CodingError> {
        let raw: [u8; SEED_SIZE] = input
            .get(..SEED_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(CodingError::InvalidPacketFormat)?;
        let raw = u32::from_be_bytes(raw);
        if raw & SYSTEMATIC_SEED_FLAG != 0 {
            Ok(SeedId::Systematic((raw & SEED_MASK) as usize))
        } else {
            Ok(SeedId::Coded(raw))
        }
    }
}
