use crate::coding::coeff_generator::CoeffGenerator;
use crate::coding::config::{CoderConfig, Limits, SymbolId};
use crate::coding::feedback::{self, RemoteStatus};
use crate::coding::payload::SeedId;
use crate::coding::rlnc::elimination::DecodingMatrix;
use crate::coding::traits::{
    Coder, CodingError, Decoder, FeedbackReader, FeedbackWriter, Recoder,
};
use crate::storage::symbol::add_scaled;
use crate::storage::{CoefficientVector, StatusBitmap, SymbolField};
use log::{debug, trace};

/// Random Linear Network Coding Decoder.
///
/// Absorbs packets into a fully reduced `DecodingMatrix`. When built with
/// recoding enabled it also emits fresh combinations of the rows it holds.
#[derive(Debug, Clone)]
pub struct RlnDecoder<F: SymbolField> {
    /// Number of source symbols
    symbols: usize,
    /// Size of each symbol in bytes
    symbol_size: usize,
    config: CoderConfig,
    limits: Limits,
    /// Reduced system of received equations
    matrix: DecodingMatrix<F>,
    /// Regenerates coefficients from packet seeds
    seed_generator: Option<CoeffGenerator<F>>,
    /// Draws recoding weights over stored rows
    recode_generator: Option<CoeffGenerator<F>>,
    /// Downstream status, when recoding is steered by feedback
    remote: Option<RemoteStatus>,
    /// Scratch space for incoming or outgoing coefficient vectors
    coefficients: CoefficientVector<F>,
    /// Scratch space for recoding weights
    weights: CoefficientVector<F>,
    rows: Vec<usize>,
}

impl<F: SymbolField> RlnDecoder<F> {
    /// Create a new RLNC decoder with the default configuration
    pub fn new() -> Self {
        Self::build(CoderConfig::default(), Limits::UNBOUNDED)
    }

    /// Create a decoder carrying the behaviours of `config`
    pub fn with_config(config: CoderConfig) -> Result<Self, CodingError> {
        config.validate()?;
        Ok(Self::build(config, Limits::UNBOUNDED))
    }

    pub(crate) fn build(config: CoderConfig, limits: Limits) -> Self {
        let seed_generator = config
            .uses_seed_ids()
            .then(|| CoeffGenerator::new(config.generator));
        let recode_generator = config
            .recoding
            .then(|| CoeffGenerator::from_optional_seed(config.generator, config.rng_seed));
        let remote = (config.recoding && config.status_aware).then(|| RemoteStatus::new(0));

        Self {
            symbols: 0,
            symbol_size: 0,
            config,
            limits,
            matrix: DecodingMatrix::default(),
            seed_generator,
            recode_generator,
            remote,
            coefficients: CoefficientVector::zero(0),
            weights: CoefficientVector::zero(0),
            rows: Vec::new(),
        }
    }

    /// The configuration this decoder was built with
    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Pivot status of the stored rows
    pub fn pivot_status(&self) -> &StatusBitmap {
        self.matrix.pivots()
    }

    /// Bytes used by the pivot bitmap in feedback
    pub fn pivot_status_size(&self) -> usize {
        feedback::pivot_status_size(self.symbols)
    }

    /// Read-only view of the decoding system
    pub fn matrix(&self) -> &DecodingMatrix<F> {
        &self.matrix
    }

    /// Status reported by the downstream decoder, when tracked
    pub fn remote_status(&self) -> Option<&RemoteStatus> {
        self.remote.as_ref()
    }

    /// Check if new coefficients would increase the rank
    pub fn check_rank_increase(&self, coefficients: &CoefficientVector<F>) -> bool {
        self.matrix.check_rank_increase(coefficients.as_slice())
    }

    /// Number of source symbols fully decoded
    pub fn symbols_decoded(&self) -> usize {
        self.matrix.symbols_decoded()
    }

    /// Whether recoded packets can be produced right now
    pub fn can_recode(&self) -> bool {
        self.recode_generator.is_some() && self.matrix.rank() > 0
    }

    /// Get the decoded block once complete
    pub fn decode_all(&self) -> Result<Vec<u8>, CodingError> {
        let mut out = vec![0u8; self.symbols * self.symbol_size];
        self.copy_symbols(&mut out)?;
        Ok(out)
    }

    fn ensure_configured(&self) -> Result<(), CodingError> {
        if self.symbols == 0 {
            return Err(CodingError::NotConfigured);
        }
        Ok(())
    }

    /// Insert one equation, logging the packet that completes the generation
    fn absorb(
        matrix: &mut DecodingMatrix<F>,
        coefficients: &[F],
        symbol: &[u8],
    ) -> Result<bool, CodingError> {
        let innovative = matrix.insert(coefficients, symbol)?;
        if innovative && matrix.is_full_rank() {
            debug!(
                "generation complete: {} symbols of {} bytes",
                matrix.symbols(),
                matrix.symbol_size()
            );
        }
        Ok(innovative)
    }
}

impl<F: SymbolField> Default for RlnDecoder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SymbolField> Coder for RlnDecoder<F> {
    fn configure(&mut self, symbols: usize, symbol_size: usize) -> Result<(), CodingError> {
        self.limits.check::<F>(symbols, symbol_size)?;

        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.matrix.configure(symbols, symbol_size);
        self.coefficients.reset(symbols);
        self.weights.reset(symbols);
        self.rows.clear();
        self.rows.reserve(symbols);
        if let Some(remote) = self.remote.as_mut() {
            remote.reset(symbols);
        }

        debug!("decoder configured: {} symbols x {} bytes", symbols, symbol_size);
        Ok(())
    }

    fn reset(&mut self) {
        self.matrix.clear();
        if let Some(remote) = self.remote.as_mut() {
            remote.reset(self.symbols);
        }
        debug!("decoder reset");
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    fn rank(&self) -> usize {
        self.matrix.rank()
    }

    fn id_size(&self) -> usize {
        self.config.id_size::<F>(self.symbols)
    }
}

impl<F: SymbolField> Decoder<F> for RlnDecoder<F> {
    fn decode(&mut self, payload: &[u8]) -> Result<bool, CodingError> {
        self.ensure_configured()?;
        if payload.len() < self.payload_size() {
            return Err(CodingError::InvalidPacketFormat);
        }

        let id_size = self.id_size();
        let symbol = &payload[id_size..id_size + self.symbol_size];
        match self.config.symbol_id {
            SymbolId::Plain => {
                self.coefficients.unpack_into(payload)?;
                Self::absorb(&mut self.matrix, self.coefficients.as_slice(), symbol)
            }
            SymbolId::Seed { .. } => match SeedId::read(payload)? {
                SeedId::Systematic(index) => self.decode_systematic_symbol(index, symbol),
                SeedId::Coded(seed) => {
                    let generator = self
                        .seed_generator
                        .as_mut()
                        .ok_or(CodingError::NotConfigured)?;
                    generator.generate_seeded(seed, &mut self.coefficients);
                    Self::absorb(&mut self.matrix, self.coefficients.as_slice(), symbol)
                }
            },
        }
    }

    fn decode_symbol(
        &mut self,
        coefficients: &CoefficientVector<F>,
        symbol: &[u8],
    ) -> Result<bool, CodingError> {
        self.ensure_configured()?;
        if coefficients.len() != self.symbols {
            return Err(CodingError::InvalidCoefficients);
        }
        if symbol.len() != self.symbol_size {
            return Err(CodingError::InvalidSymbolSize);
        }
        Self::absorb(&mut self.matrix, coefficients.as_slice(), symbol)
    }

    fn decode_systematic_symbol(
        &mut self,
        index: usize,
        symbol: &[u8],
    ) -> Result<bool, CodingError> {
        self.ensure_configured()?;
        if index >= self.symbols {
            return Err(CodingError::InvalidPacketFormat);
        }
        if symbol.len() != self.symbol_size {
            return Err(CodingError::InvalidSymbolSize);
        }
        if self.matrix.is_decoded(index) {
            trace!("duplicate systematic symbol {}", index);
            return Ok(false);
        }
        self.coefficients.clear();
        self.coefficients[index] = F::ONE;
        Self::absorb(&mut self.matrix, self.coefficients.as_slice(), symbol)
    }

    fn is_symbol_pivot(&self, index: usize) -> bool {
        self.matrix.is_pivot(index)
    }

    fn is_symbol_decoded(&self, index: usize) -> bool {
        index < self.symbols && self.matrix.is_decoded(index)
    }

    fn symbol(&self, index: usize) -> Option<&[u8]> {
        self.is_symbol_decoded(index)
            .then(|| self.matrix.row_data(index))
    }

    fn copy_symbols(&self, out: &mut [u8]) -> Result<(), CodingError> {
        self.ensure_configured()?;
        if !self.is_complete() {
            return Err(CodingError::InsufficientData);
        }
        if out.len() < self.symbols * self.symbol_size {
            return Err(CodingError::BufferTooSmall);
        }
        for (i, chunk) in out
            .chunks_exact_mut(self.symbol_size)
            .take(self.symbols)
            .enumerate()
        {
            chunk.copy_from_slice(self.matrix.row_data(i));
        }
        Ok(())
    }
}

impl<F: SymbolField> Recoder<F> for RlnDecoder<F> {
    fn recode(&mut self, payload: &mut [u8]) -> Result<usize, CodingError> {
        self.ensure_configured()?;
        let generator = self
            .recode_generator
            .as_mut()
            .ok_or(CodingError::NotSupported)?;
        if self.matrix.rank() == 0 {
            return Err(CodingError::InsufficientData);
        }
        let id_size = self.config.id_size::<F>(self.symbols);
        if payload.len() < id_size + self.symbol_size {
            return Err(CodingError::BufferTooSmall);
        }

        // Rows the downstream decoder already pivots on are skipped unless
        // nothing else is left.
        self.rows.clear();
        self.rows.extend(self.matrix.pivots().iter_ones());
        if let Some(remote) = self.remote.as_ref().filter(|r| r.has_feedback()) {
            let unresolved = self
                .rows
                .iter()
                .filter(|&&row| !remote.is_symbol_pivot(row))
                .count();
            if unresolved > 0 {
                self.rows.retain(|&row| !remote.is_symbol_pivot(row));
            }
        }

        self.weights.reset(self.rows.len());
        generator.generate(&mut self.weights);

        self.coefficients.clear();
        let data = &mut payload[id_size..id_size + self.symbol_size];
        data.fill(0);
        for (&row, &weight) in self.rows.iter().zip(self.weights.as_slice()) {
            if weight.is_zero() {
                continue;
            }
            for (out, value) in self
                .coefficients
                .as_mut_slice()
                .iter_mut()
                .zip(self.matrix.row_coefficients(row))
            {
                *out = *out + *value * weight;
            }
            add_scaled(data, self.matrix.row_data(row), weight);
        }

        self.coefficients.pack(payload)?;
        trace!(
            "recoded packet over {} of {} rows",
            self.rows.len(),
            self.matrix.rank()
        );
        Ok(id_size + self.symbol_size)
    }
}

impl<F: SymbolField> FeedbackWriter for RlnDecoder<F> {
    fn feedback_size(&self) -> usize {
        feedback::feedback_size(self.symbols, &self.config.feedback_extensions)
    }

    fn write_feedback(&self, out: &mut [u8]) -> Result<usize, CodingError> {
        self.ensure_configured()?;
        feedback::write_feedback(
            self.matrix.pivots(),
            self.matrix.rank(),
            &self.config.feedback_extensions,
            out,
        )
    }
}

impl<F: SymbolField> FeedbackReader for RlnDecoder<F> {
    fn read_feedback(&mut self, input: &[u8]) -> Result<(), CodingError> {
        self.ensure_configured()?;
        let remote = self.remote.as_mut().ok_or(CodingError::NotSupported)?;
        remote.read(input, &self.config.feedback_extensions)?;
        Ok(())
    }
}
