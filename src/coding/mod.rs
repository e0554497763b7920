//! Network coding implementations

/// Coefficient vector generation
pub mod coeff_generator;
/// Coder configuration
pub mod config;
/// Coder construction under fixed bounds
pub mod factory;
/// Pivot-status feedback protocol
pub mod feedback;
/// Packet identifiers
pub mod payload;
/// Random Linear Network Coding implementation
pub mod rlnc;
/// Sparse coefficient generation for RLNC
pub mod sparse;
/// Core coding traits and error types
pub mod traits;

pub use coeff_generator::{CoeffGenerator, Selection};
pub use config::{CoderConfig, FeedbackExtension, GeneratorKind, SymbolId};
pub use factory::CoderFactory;
pub use feedback::RemoteStatus;
pub use rlnc::{RlnDecoder, RlnEncoder};
pub use sparse::SparseConfig;
pub use traits::{
    Coder, CodingError, Decoder, Encoder, FeedbackReader, FeedbackWriter, Recoder,
    SystematicToggle,
};
