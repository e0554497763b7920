//! Coder construction under fixed upper bounds

use crate::coding::config::{CoderConfig, Limits};
use crate::coding::feedback;
use crate::coding::rlnc::{RlnDecoder, RlnEncoder};
use crate::coding::traits::{Coder, CodingError};
use crate::storage::SymbolField;
use std::marker::PhantomData;

/// Builds encoders and decoders sharing one configuration.
///
/// Every coder built here rejects generations larger than the factory
/// bounds, so buffers sized by `max_payload_size` and `max_feedback_size`
/// fit any packet they produce.
#[derive(Debug, Clone)]
pub struct CoderFactory<F: SymbolField> {
    limits: Limits,
    config: CoderConfig,
    _marker: PhantomData<F>,
}

impl<F: SymbolField> CoderFactory<F> {
    /// Create a factory for generations up to `max_symbols` symbols of
    /// `max_symbol_size` bytes
    pub fn new(
        max_symbols: usize,
        max_symbol_size: usize,
        config: CoderConfig,
    ) -> Result<Self, CodingError> {
        config.validate()?;
        Limits::UNBOUNDED.check::<F>(max_symbols, max_symbol_size)?;

        Ok(Self {
            limits: Limits {
                max_symbols,
                max_symbol_size,
            },
            config,
            _marker: PhantomData,
        })
    }

    /// The configuration handed to every coder
    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Largest generation a built coder accepts
    pub fn max_symbols(&self) -> usize {
        self.limits.max_symbols
    }

    /// Largest symbol a built coder accepts
    pub fn max_symbol_size(&self) -> usize {
        self.limits.max_symbol_size
    }

    /// Largest packet identifier
    pub fn max_id_size(&self) -> usize {
        self.config.id_size::<F>(self.limits.max_symbols)
    }

    /// Largest packet
    pub fn max_payload_size(&self) -> usize {
        self.max_id_size() + self.limits.max_symbol_size
    }

    /// Largest pivot bitmap
    pub fn max_pivot_status_size(&self) -> usize {
        feedback::pivot_status_size(self.limits.max_symbols)
    }

    /// Largest feedback message
    pub fn max_feedback_size(&self) -> usize {
        feedback::feedback_size(self.limits.max_symbols, &self.config.feedback_extensions)
    }

    /// Build an encoder configured for the given generation
    pub fn build_encoder(
        &self,
        symbols: usize,
        symbol_size: usize,
    ) -> Result<RlnEncoder<F>, CodingError> {
        let mut encoder = RlnEncoder::build(self.config.clone(), self.limits);
        encoder.configure(symbols, symbol_size)?;
        Ok(encoder)
    }

    /// Build a decoder configured for the given generation
    pub fn build_decoder(
        &self,
        symbols: usize,
        symbol_size: usize,
    ) -> Result<RlnDecoder<F>, CodingError> {
        let mut decoder = RlnDecoder::build(self.config.clone(), self.limits);
        decoder.configure(symbols, symbol_size)?;
        Ok(decoder)
    }
}
