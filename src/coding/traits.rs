use crate::storage::{CoefficientVector, SymbolField};
use thiserror::Error;

/// Error type for encoding and decoding operations.
///
/// These are boundary errors: misconfiguration, malformed buffers and calls
/// made before the coder is ready. A packet that brings no new information is
/// not an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingError {
    #[error("Invalid parameters provided")]
    InvalidParameters,

    #[error("Insufficient data for decoding")]
    InsufficientData,

    #[error("Invalid symbol size")]
    InvalidSymbolSize,

    #[error("Decoding failed")]
    DecodingFailed,

    #[error("Invalid packet format")]
    InvalidPacketFormat,

    #[error("Buffer too small")]
    BufferTooSmall,

    #[error("Not configured")]
    NotConfigured,

    #[error("No data set")]
    NoDataSet,

    #[error("Invalid data size")]
    InvalidDataSize,

    #[error("Invalid coefficients")]
    InvalidCoefficients,

    #[error("Operation not enabled for this coder")]
    NotSupported,
}

/// State shared by every coder of a generation
pub trait Coder {
    /// Configure the coder for a generation, clearing all previous state
    fn configure(&mut self, symbols: usize, symbol_size: usize) -> Result<(), CodingError>;

    /// Clear all generation state, keeping the configured dimensions
    fn reset(&mut self);

    /// Get the number of source symbols
    fn symbols(&self) -> usize;

    /// Get the symbol size in bytes
    fn symbol_size(&self) -> usize;

    /// Number of independent symbols held
    fn rank(&self) -> usize;

    /// Size of the packet identifier (coefficient vector or seed)
    fn id_size(&self) -> usize;

    /// Upper bound of a packet produced or consumed by this coder
    fn payload_size(&self) -> usize {
        self.id_size() + self.symbol_size()
    }
}

/// Trait for network encoders
pub trait Encoder<F: SymbolField>: Coder {
    /// Set the data of all source symbols
    fn set_symbols(&mut self, data: &[u8]) -> Result<(), CodingError>;

    /// Set the data of a single source symbol
    fn set_symbol(&mut self, index: usize, data: &[u8]) -> Result<(), CodingError>;

    /// Combine the source symbols under `coefficients`
    fn encode_symbol(&self, coefficients: &CoefficientVector<F>) -> Result<Vec<u8>, CodingError>;

    /// Generate a coded packet with coefficients
    fn encode_packet(&mut self) -> Result<(CoefficientVector<F>, Vec<u8>), CodingError>;

    /// Write the next packet (`[identifier][data]`) into `payload`,
    /// returning the number of bytes written
    fn encode(&mut self, payload: &mut [u8]) -> Result<usize, CodingError>;
}

/// Trait for network decoders
pub trait Decoder<F: SymbolField>: Coder {
    /// Absorb a packet produced by a matching encoder or recoder.
    ///
    /// Returns `Ok(true)` if the packet increased the rank.
    fn decode(&mut self, payload: &[u8]) -> Result<bool, CodingError>;

    /// Absorb a coded symbol given its coefficients
    fn decode_symbol(
        &mut self,
        coefficients: &CoefficientVector<F>,
        symbol: &[u8],
    ) -> Result<bool, CodingError>;

    /// Absorb an uncoded source symbol
    fn decode_systematic_symbol(&mut self, index: usize, symbol: &[u8])
        -> Result<bool, CodingError>;

    /// Check if all source symbols can be recovered
    fn is_complete(&self) -> bool {
        self.symbols() > 0 && self.rank() == self.symbols()
    }

    /// Check if a row with leading column `index` is held
    fn is_symbol_pivot(&self, index: usize) -> bool;

    /// Check if source symbol `index` is fully decoded
    fn is_symbol_decoded(&self, index: usize) -> bool;

    /// The data of source symbol `index` once decoded
    fn symbol(&self, index: usize) -> Option<&[u8]>;

    /// Copy the decoded block into `out`
    fn copy_symbols(&self, out: &mut [u8]) -> Result<(), CodingError>;
}

/// Decoders able to emit new coded packets from their partial state
pub trait Recoder<F: SymbolField>: Decoder<F> {
    /// Write a recoded packet into `payload`, returning the bytes written
    fn recode(&mut self, payload: &mut [u8]) -> Result<usize, CodingError>;
}

/// Coders that serialize status for an upstream sender
pub trait FeedbackWriter {
    /// Bytes written by `write_feedback`
    fn feedback_size(&self) -> usize;

    /// Serialize the feedback, returning the bytes written
    fn write_feedback(&self, feedback: &mut [u8]) -> Result<usize, CodingError>;
}

/// Coders that steer their output by downstream status
pub trait FeedbackReader {
    /// Absorb feedback written by a downstream `FeedbackWriter`
    fn read_feedback(&mut self, feedback: &[u8]) -> Result<(), CodingError>;
}

/// Coders whose systematic phase can be switched at runtime
pub trait SystematicToggle {
    /// Whether uncoded symbols are sent first
    fn is_systematic_on(&self) -> bool;

    /// Enable the systematic phase
    fn set_systematic_on(&mut self);

    /// Disable the systematic phase
    fn set_systematic_off(&mut self);
}
