//! Shared utilities

mod rand;

pub use self::rand::CodingRng;
