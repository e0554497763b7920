//! Random Linear Network Coding (RLNC) implementation

mod decoder;
mod elimination;
mod encoder;

pub use decoder::RlnDecoder;
pub use elimination::DecodingMatrix;
pub use encoder::RlnEncoder;
