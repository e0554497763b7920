//! Feedback / pivot-status protocol
//!
//! Wire format: `[pivot bitmap][extension 0][extension 1]...`. The bitmap
//! occupies the first `pivot_status_size` bytes; extensions follow at fixed
//! offsets in configuration order, so writer and reader must share the same
//! extension list.

use crate::coding::config::FeedbackExtension;
use crate::coding::traits::CodingError;
use crate::storage::StatusBitmap;
use log::trace;

/// Bytes used by the pivot bitmap of a generation of `symbols`
pub fn pivot_status_size(symbols: usize) -> usize {
    StatusBitmap::size_for(symbols)
}

/// Bytes used by a feedback message
pub fn feedback_size(symbols: usize, extensions: &[FeedbackExtension]) -> usize {
    pivot_status_size(symbols) + extensions.iter().map(|ext| ext.size()).sum::<usize>()
}

/// Serialize decoder status into `out`, returning the bytes written
pub fn write_feedback(
    pivots: &StatusBitmap,
    rank: usize,
    extensions: &[FeedbackExtension],
    out: &mut [u8],
) -> Result<usize, CodingError> {
    if out.len() < feedback_size(pivots.len(), extensions) {
        return Err(CodingError::BufferTooSmall);
    }

    let mut written = pivots.write(out)?;
    for extension in extensions {
        written += match extension {
            FeedbackExtension::Rank => {
                let rank = u32::try_from(rank).map_err(|_| CodingError::InvalidParameters)?;
                out[written..written + 4].copy_from_slice(&rank.to_be_bytes());
                4
            }
        };
    }
    Ok(written)
}

/// What a sender knows about a downstream decoder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteStatus {
    pivots: StatusBitmap,
    rank: usize,
}

impl RemoteStatus {
    /// Status of a decoder that has reported nothing yet
    pub fn new(symbols: usize) -> Self {
        Self {
            pivots: StatusBitmap::new(symbols),
            rank: 0,
        }
    }

    /// Forget everything, resizing to `symbols`
    pub fn reset(&mut self, symbols: usize) {
        self.pivots.reset(symbols);
        self.rank = 0;
    }

    /// Pivot bitmap from the latest feedback
    pub fn pivots(&self) -> &StatusBitmap {
        &self.pivots
    }

    /// Highest rank reported so far
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether the remote holds a pivot for `index`
    pub fn is_symbol_pivot(&self, index: usize) -> bool {
        self.pivots.get(index)
    }

    /// Whether any received feedback resolved a symbol
    pub fn has_feedback(&self) -> bool {
        self.pivots.any()
    }

    /// Absorb a feedback message, returning the bytes consumed.
    ///
    /// The bitmap replaces the previous one; the rank never decreases, so a
    /// stale message delivered late cannot roll it back.
    pub fn read(
        &mut self,
        input: &[u8],
        extensions: &[FeedbackExtension],
    ) -> Result<usize, CodingError> {
        if input.len() < feedback_size(self.pivots.len(), extensions) {
            return Err(CodingError::InvalidPacketFormat);
        }

        let mut pivots = StatusBitmap::new(self.pivots.len());
        let mut read = pivots.read(input)?;
        let mut rank = pivots.count();
        for extension in extensions {
            read += match extension {
                FeedbackExtension::Rank => {
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(&input[read..read + 4]);
                    let reported = u32::from_be_bytes(raw) as usize;
                    if reported > pivots.len() {
                        return Err(CodingError::InvalidPacketFormat);
                    }
                    rank = rank.max(reported);
                    4
                }
            };
        }
        self.pivots = pivots;
        self.rank = self.rank.max(rank);
        trace!(
            "feedback read: {} pivots, remote rank {}",
            self.pivots.count(),
            self.rank
        );
        Ok(read)
    }
}
