#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub use binius_field::underlier::WithUnderlier;
pub use binius_field::{AESTowerField8b, BinaryField16b, BinaryField8b, Field as BiniusField};

pub mod coding;
pub mod storage;
pub mod utils;
