//! Symbol, coefficient and status storage

mod coefficients;
mod field;
mod status;
/// Symbol buffers and the field kernels operating on them
pub mod symbol;

pub use coefficients::CoefficientVector;
pub use field::SymbolField;
pub use status::StatusBitmap;
pub use symbol::Symbol;
