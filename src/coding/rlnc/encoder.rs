use crate::coding::coeff_generator::CoeffGenerator;
use crate::coding::config::{CoderConfig, Limits, SymbolId};
use crate::coding::feedback::RemoteStatus;
use crate::coding::payload::{SeedId, SEED_MASK};
use crate::coding::traits::{Coder, CodingError, Encoder, FeedbackReader, SystematicToggle};
use crate::storage::symbol::add_scaled;
use crate::storage::{CoefficientVector, StatusBitmap, Symbol, SymbolField};
use log::{debug, trace};

/// Random Linear Network Coding Encoder
#[derive(Debug, Clone)]
pub struct RlnEncoder<F: SymbolField> {
    /// Number of source symbols
    symbols: usize,
    /// Size of each symbol in bytes
    symbol_size: usize,
    config: CoderConfig,
    limits: Limits,
    /// Source symbols assigned so far
    data: Vec<Option<Symbol>>,
    available: StatusBitmap,
    /// Coefficient generator
    generator: CoeffGenerator<F>,
    systematic: bool,
    /// Symbols already sent uncoded
    sent: StatusBitmap,
    /// Status of the downstream decoder, when feedback is used
    remote: Option<RemoteStatus>,
    next_seed: u32,
    coefficients: CoefficientVector<F>,
}

impl<F: SymbolField> RlnEncoder<F> {
    /// Create a new RLNC encoder
    pub fn new() -> Self {
        Self::build(CoderConfig::default(), Limits::UNBOUNDED)
    }

    /// Create a new RLNC encoder with a specific seed for deterministic behavior
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::build(CoderConfig::default().with_rng_seed(seed), Limits::UNBOUNDED)
    }

    /// Create an encoder carrying the behaviours of `config`
    pub fn with_config(config: CoderConfig) -> Result<Self, CodingError> {
        config.validate()?;
        Ok(Self::build(config, Limits::UNBOUNDED))
    }

    pub(crate) fn build(config: CoderConfig, limits: Limits) -> Self {
        let generator = CoeffGenerator::from_optional_seed(config.generator, config.rng_seed);
        let remote = config.status_aware.then(|| RemoteStatus::new(0));

        Self {
            symbols: 0,
            symbol_size: 0,
            systematic: config.systematic,
            config,
            limits,
            data: Vec::new(),
            available: StatusBitmap::default(),
            generator,
            sent: StatusBitmap::default(),
            remote,
            next_seed: 0,
            coefficients: CoefficientVector::zero(0),
        }
    }

    /// The configuration this encoder was built with
    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Get the total size of the data in bytes
    pub fn data_size(&self) -> usize {
        self.symbols * self.symbol_size
    }

    /// Source symbols assigned so far
    pub fn available(&self) -> &StatusBitmap {
        &self.available
    }

    /// Whether source symbol `index` has been assigned
    pub fn is_symbol_available(&self, index: usize) -> bool {
        self.available.get(index)
    }

    /// Status reported by the downstream decoder, when tracked
    pub fn remote_status(&self) -> Option<&RemoteStatus> {
        self.remote.as_ref()
    }

    /// Whether the next packet will be an uncoded source symbol
    pub fn in_systematic_phase(&self) -> bool {
        self.next_systematic().is_some()
    }

    fn ensure_ready(&self) -> Result<(), CodingError> {
        if self.symbols == 0 {
            return Err(CodingError::NotConfigured);
        }
        if !self.available.any() {
            return Err(CodingError::NoDataSet);
        }
        Ok(())
    }

    /// Lowest available symbol not yet sent uncoded nor resolved downstream
    fn next_systematic(&self) -> Option<usize> {
        if !self.systematic {
            return None;
        }
        self.available.iter_ones().find(|&index| {
            !self.sent.get(index)
                && !self
                    .remote
                    .as_ref()
                    .is_some_and(|remote| remote.is_symbol_pivot(index))
        })
    }

    /// Write `Σ c_i · x_i` over the scratch coefficients into `out`
    fn combine(&self, coefficients: &[F], out: &mut [u8]) -> Result<(), CodingError> {
        out.fill(0);
        for (coefficient, symbol) in coefficients.iter().zip(&self.data) {
            if coefficient.is_zero() {
                continue;
            }
            let symbol = symbol.as_ref().ok_or(CodingError::InsufficientData)?;
            add_scaled(out, symbol.as_slice(), *coefficient);
        }
        Ok(())
    }

    fn draw_coefficients(&mut self) {
        let remote = self
            .remote
            .as_ref()
            .map(|remote| remote.pivots());
        let selection = self
            .generator
            .generate_for(&mut self.coefficients, &self.available, remote);
        trace!("coefficients drawn with {:?} selection", selection);
    }
}

impl<F: SymbolField> Default for RlnEncoder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SymbolField> Coder for RlnEncoder<F> {
    fn configure(&mut self, symbols: usize, symbol_size: usize) -> Result<(), CodingError> {
        self.limits.check::<F>(symbols, symbol_size)?;

        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.data.clear();
        self.data.resize(symbols, None);
        self.available.reset(symbols);
        self.sent.reset(symbols);
        self.coefficients.reset(symbols);
        if let Some(remote) = self.remote.as_mut() {
            remote.reset(symbols);
        }
        self.next_seed = match self.config.symbol_id {
            SymbolId::Seed { base_seed } => base_seed & SEED_MASK,
            SymbolId::Plain => 0,
        };

        debug!("encoder configured: {} symbols x {} bytes", symbols, symbol_size);
        Ok(())
    }

    fn reset(&mut self) {
        let (symbols, symbol_size) = (self.symbols, self.symbol_size);
        if symbols == 0 {
            return;
        }
        self.data.iter_mut().for_each(|symbol| *symbol = None);
        self.available.reset(symbols);
        self.sent.reset(symbols);
        if let Some(remote) = self.remote.as_mut() {
            remote.reset(symbols);
        }
        if let SymbolId::Seed { base_seed } = self.config.symbol_id {
            self.next_seed = base_seed & SEED_MASK;
        }
        debug!("encoder reset: {} symbols x {} bytes", symbols, symbol_size);
    }

    fn symbols(&self) -> usize {
        self.symbols
    }

    fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    fn rank(&self) -> usize {
        self.available.count()
    }

    fn id_size(&self) -> usize {
        self.config.id_size::<F>(self.symbols)
    }
}

impl<F: SymbolField> Encoder<F> for RlnEncoder<F> {
    fn set_symbols(&mut self, data: &[u8]) -> Result<(), CodingError> {
        if self.symbols == 0 {
            return Err(CodingError::NotConfigured);
        }
        if data.len() != self.data_size() {
            return Err(CodingError::InvalidDataSize);
        }

        for (slot, chunk) in self.data.iter_mut().zip(data.chunks_exact(self.symbol_size)) {
            *slot = Some(Symbol::from_slice(chunk));
        }
        for index in 0..self.symbols {
            self.available.set(index);
        }
        Ok(())
    }

    fn set_symbol(&mut self, index: usize, data: &[u8]) -> Result<(), CodingError> {
        if self.symbols == 0 {
            return Err(CodingError::NotConfigured);
        }
        if index >= self.symbols {
            return Err(CodingError::InvalidParameters);
        }
        if data.len() != self.symbol_size {
            return Err(CodingError::InvalidDataSize);
        }

        self.data[index] = Some(Symbol::from_slice(data));
        self.available.set(index);
        trace!("symbol {} available, rank {}", index, self.rank());
        Ok(())
    }

    fn encode_symbol(&self, coefficients: &CoefficientVector<F>) -> Result<Vec<u8>, CodingError> {
        self.ensure_ready()?;
        if coefficients.len() != self.symbols {
            return Err(CodingError::InvalidCoefficients);
        }

        let mut encoded = vec![0u8; self.symbol_size];
        self.combine(coefficients.as_slice(), &mut encoded)?;
        Ok(encoded)
    }

    fn encode_packet(&mut self) -> Result<(CoefficientVector<F>, Vec<u8>), CodingError> {
        self.ensure_ready()?;

        self.draw_coefficients();
        let symbol = self.encode_symbol(&self.coefficients)?;
        Ok((self.coefficients.clone(), symbol))
    }

    fn encode(&mut self, payload: &mut [u8]) -> Result<usize, CodingError> {
        self.ensure_ready()?;
        let id_size = self.id_size();
        let size = id_size + self.symbol_size;
        if payload.len() < size {
            return Err(CodingError::BufferTooSmall);
        }
        let (id, data) = payload[..size].split_at_mut(id_size);

        if let Some(index) = self.next_systematic() {
            match self.config.symbol_id {
                SymbolId::Plain => {
                    self.coefficients.clear();
                    self.coefficients[index] = F::ONE;
                    self.coefficients.pack(id)?;
                }
                SymbolId::Seed { .. } => {
                    SeedId::Systematic(index).write(id)?;
                }
            }
            let symbol = self.data[index]
                .as_ref()
                .ok_or(CodingError::InsufficientData)?;
            data.copy_from_slice(symbol.as_slice());
            self.sent.set(index);
            trace!("systematic symbol {} sent", index);
            return Ok(size);
        }

        match self.config.symbol_id {
            SymbolId::Plain => {
                self.draw_coefficients();
                self.coefficients.pack(id)?;
            }
            SymbolId::Seed { .. } => {
                // A seed only describes a vector over the whole generation
                if !self.available.all() {
                    return Err(CodingError::InsufficientData);
                }
                let seed = self.next_seed;
                self.next_seed = seed.wrapping_add(1) & SEED_MASK;
                self.generator.generate_seeded(seed, &mut self.coefficients);
                SeedId::Coded(seed).write(id)?;
            }
        }
        self.combine(self.coefficients.as_slice(), data)?;
        Ok(size)
    }
}

impl<F: SymbolField> FeedbackReader for RlnEncoder<F> {
    fn read_feedback(&mut self, feedback: &[u8]) -> Result<(), CodingError> {
        if self.symbols == 0 {
            return Err(CodingError::NotConfigured);
        }
        let remote = self.remote.as_mut().ok_or(CodingError::NotSupported)?;
        remote.read(feedback, &self.config.feedback_extensions)?;
        debug!(
            "encoder feedback: remote rank {} of {}",
            remote.rank(),
            self.symbols
        );
        Ok(())
    }
}

impl<F: SymbolField> SystematicToggle for RlnEncoder<F> {
    fn is_systematic_on(&self) -> bool {
        self.systematic
    }

    fn set_systematic_on(&mut self) {
        self.systematic = true;
    }

    fn set_systematic_off(&mut self) {
        self.systematic = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::config::FeedbackExtension;
    use crate::coding::feedback::write_feedback;
    use binius_field::{AESTowerField8b as GF256, Field as BiniusField};

    fn coded() -> CoderConfig {
        CoderConfig::default().with_systematic(false)
    }

    #[test]
    fn test_encoder_configuration() {
        let mut encoder = RlnEncoder::<GF256>::new();
        assert!(encoder.configure(4, 16).is_ok());
        assert_eq!(encoder.symbols(), 4);
        assert_eq!(encoder.symbol_size(), 16);
        assert_eq!(encoder.id_size(), 4);
        assert_eq!(encoder.payload_size(), 20);
        assert_eq!(encoder.rank(), 0);
    }

    #[test]
    fn test_encoder_invalid_configuration() {
        let mut encoder = RlnEncoder::<GF256>::new();
        assert_eq!(encoder.configure(0, 16), Err(CodingError::InvalidParameters));
        assert_eq!(encoder.configure(4, 0), Err(CodingError::InvalidParameters));
    }

    #[test]
    fn test_encoder_set_symbols() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(4, 4).unwrap();

        let data: Vec<u8> = (1..=16).collect();
        assert!(encoder.set_symbols(&data).is_ok());
        assert_eq!(encoder.rank(), 4);
        assert_eq!(
            encoder.set_symbols(&[1, 2, 3]),
            Err(CodingError::InvalidDataSize)
        );
    }

    #[test]
    fn test_encoder_not_configured() {
        let mut encoder = RlnEncoder::<GF256>::new();
        assert_eq!(
            encoder.set_symbols(&[1, 2, 3, 4]),
            Err(CodingError::NotConfigured)
        );
        let mut payload = [0u8; 8];
        assert_eq!(encoder.encode(&mut payload), Err(CodingError::NotConfigured));
    }

    #[test]
    fn test_encode_without_data() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(2, 4).unwrap();

        let mut payload = vec![0u8; encoder.payload_size()];
        assert_eq!(encoder.encode(&mut payload), Err(CodingError::NoDataSet));
        assert_eq!(
            encoder.encode_packet().map(|_| ()),
            Err(CodingError::NoDataSet)
        );
    }

    #[test]
    fn test_encode_symbol() {
        let mut encoder = RlnEncoder::<GF256>::with_seed([99; 32]);
        encoder.configure(2, 4).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let coeffs = CoefficientVector::from_values(vec![GF256::from(1), GF256::from(2)]);
        let encoded = encoder.encode_symbol(&coeffs).unwrap();

        assert_eq!(encoded.len(), 4);
        // Multiplication in AESTowerField8b
        assert_eq!(encoded, vec![11, 14, 13, 20]);
    }

    #[test]
    fn test_encode_symbol_wrong_coefficients_length() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(2, 4).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let coeffs = CoefficientVector::from_values(vec![GF256::from(1)]);
        assert_eq!(
            encoder.encode_symbol(&coeffs),
            Err(CodingError::InvalidCoefficients)
        );
    }

    #[test]
    fn test_encode_packet() {
        let mut encoder = RlnEncoder::<GF256>::with_seed([0; 32]);
        encoder.configure(2, 4).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let (coeffs, symbol) = encoder.encode_packet().unwrap();
        assert_eq!(coeffs.len(), 2);
        assert_eq!(symbol, encoder.encode_symbol(&coeffs).unwrap());
    }

    #[test]
    fn test_encoder_deterministic_with_seed() {
        let mut encoder1 = RlnEncoder::<GF256>::with_seed([42; 32]);
        let mut encoder2 = RlnEncoder::<GF256>::with_seed([42; 32]);

        encoder1.configure(2, 4).unwrap();
        encoder2.configure(2, 4).unwrap();

        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        encoder1.set_symbols(&data).unwrap();
        encoder2.set_symbols(&data).unwrap();

        let (coeffs1, symbol1) = encoder1.encode_packet().unwrap();
        let (coeffs2, symbol2) = encoder2.encode_packet().unwrap();

        assert_eq!(coeffs1, coeffs2);
        assert_eq!(symbol1, symbol2);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(2, 4).unwrap();
        encoder.set_symbols(&[0; 8]).unwrap();

        let mut payload = vec![0u8; 5];
        assert_eq!(encoder.encode(&mut payload), Err(CodingError::BufferTooSmall));
    }

    #[test]
    fn test_systematic_phase_sends_unit_vectors() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(3, 2).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert!(encoder.is_systematic_on());

        let mut payload = vec![0u8; encoder.payload_size()];
        for index in 0..3 {
            assert!(encoder.in_systematic_phase());
            assert_eq!(encoder.encode(&mut payload).unwrap(), 5);
            let coeffs = CoefficientVector::<GF256>::unpack(&payload, 3).unwrap();
            assert_eq!(coeffs, CoefficientVector::unit(3, index));
            let start = index * 2;
            assert_eq!(&payload[3..], &[start as u8 + 1, start as u8 + 2]);
        }
        assert!(!encoder.in_systematic_phase());
    }

    #[test]
    fn test_systematic_toggle() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(2, 2).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4]).unwrap();

        encoder.set_systematic_off();
        assert!(!encoder.is_systematic_on());
        assert!(!encoder.in_systematic_phase());

        encoder.set_systematic_on();
        assert!(encoder.in_systematic_phase());
    }

    #[test]
    fn test_on_the_fly_encoding() {
        let mut encoder = RlnEncoder::<GF256>::with_config(coded().with_rng_seed([5; 32])).unwrap();
        encoder.configure(4, 2).unwrap();
        encoder.set_symbol(1, &[7, 7]).unwrap();
        encoder.set_symbol(2, &[9, 9]).unwrap();
        assert_eq!(encoder.rank(), 2);
        assert!(encoder.is_symbol_available(1));
        assert!(!encoder.is_symbol_available(0));

        let mut payload = vec![0u8; encoder.payload_size()];
        for _ in 0..20 {
            encoder.encode(&mut payload).unwrap();
            let coeffs = CoefficientVector::<GF256>::unpack(&payload, 4).unwrap();
            assert!(coeffs[0].is_zero());
            assert!(coeffs[3].is_zero());
        }

        assert_eq!(encoder.set_symbol(4, &[0, 0]), Err(CodingError::InvalidParameters));
        assert_eq!(encoder.set_symbol(0, &[0]), Err(CodingError::InvalidDataSize));
    }

    #[test]
    fn test_seed_identifiers() {
        let config = CoderConfig::default().with_seed_ids(10);
        let mut encoder = RlnEncoder::<GF256>::with_config(config).unwrap();
        encoder.configure(2, 2).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4]).unwrap();
        assert_eq!(encoder.id_size(), 4);

        let mut payload = vec![0u8; encoder.payload_size()];
        encoder.encode(&mut payload).unwrap();
        assert_eq!(payload, vec![0x80, 0, 0, 0, 1, 2]);
        encoder.encode(&mut payload).unwrap();
        assert_eq!(payload, vec![0x80, 0, 0, 1, 3, 4]);

        encoder.encode(&mut payload).unwrap();
        assert_eq!(SeedId::read(&payload).unwrap(), SeedId::Coded(10));
        encoder.encode(&mut payload).unwrap();
        assert_eq!(SeedId::read(&payload).unwrap(), SeedId::Coded(11));
    }

    #[test]
    fn test_seeded_encoder_needs_every_symbol() {
        let config = coded().with_seed_ids(0);
        let mut encoder = RlnEncoder::<GF256>::with_config(config).unwrap();
        encoder.configure(2, 2).unwrap();
        encoder.set_symbol(0, &[1, 2]).unwrap();

        let mut payload = vec![0u8; encoder.payload_size()];
        assert_eq!(encoder.encode(&mut payload), Err(CodingError::InsufficientData));
        encoder.set_symbol(1, &[3, 4]).unwrap();
        assert_eq!(encoder.encode(&mut payload).unwrap(), 6);
    }

    #[test]
    fn test_feedback_requires_status_awareness() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(4, 1).unwrap();
        assert_eq!(encoder.read_feedback(&[0]), Err(CodingError::NotSupported));
    }

    #[test]
    fn test_status_aware_encoding() {
        let config = CoderConfig::default()
            .with_status_awareness(true)
            .with_feedback_extension(FeedbackExtension::Rank)
            .with_rng_seed([11; 32]);
        let mut encoder = RlnEncoder::<GF256>::with_config(config).unwrap();
        encoder.configure(4, 1).unwrap();
        encoder.set_symbols(&[10, 20, 30, 40]).unwrap();

        let mut resolved = StatusBitmap::new(4);
        resolved.set(0);
        resolved.set(2);
        let mut feedback = vec![0u8; 5];
        write_feedback(&resolved, 2, &[FeedbackExtension::Rank], &mut feedback).unwrap();
        encoder.read_feedback(&feedback).unwrap();
        assert_eq!(encoder.remote_status().map(|r| r.rank()), Some(2));

        // Systematic phase skips what the receiver already has
        let mut payload = vec![0u8; encoder.payload_size()];
        encoder.encode(&mut payload).unwrap();
        assert_eq!(payload[4], 20);
        encoder.encode(&mut payload).unwrap();
        assert_eq!(payload[4], 40);
        assert!(!encoder.in_systematic_phase());

        for _ in 0..20 {
            encoder.encode(&mut payload).unwrap();
            let coeffs = CoefficientVector::<GF256>::unpack(&payload, 4).unwrap();
            assert_eq!(coeffs[0], GF256::ZERO);
            assert_eq!(coeffs[2], GF256::ZERO);
        }

        // Reset forgets the receiver as well
        encoder.reset();
        let remote = encoder.remote_status().unwrap();
        assert!(!remote.has_feedback());
        assert_eq!(remote.rank(), 0);
    }

    #[test]
    fn test_encoder_reset() {
        let mut encoder = RlnEncoder::<GF256>::new();
        encoder.configure(2, 2).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4]).unwrap();
        let mut payload = vec![0u8; encoder.payload_size()];
        encoder.encode(&mut payload).unwrap();

        encoder.reset();
        assert_eq!(encoder.rank(), 0);
        assert_eq!(encoder.symbols(), 2);
        assert_eq!(encoder.encode(&mut payload), Err(CodingError::NoDataSet));

        encoder.set_symbols(&[1, 2, 3, 4]).unwrap();
        encoder.encode(&mut payload).unwrap();
        assert_eq!(&payload[2..], &[1, 2]);
    }

    #[test]
    fn test_encoder_reuse() {
        let mut encoder = RlnEncoder::<GF256>::with_config(coded()).unwrap();

        encoder.configure(2, 4).unwrap();
        encoder.set_symbols(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let (coeffs, _) = encoder.encode_packet().unwrap();
        assert_eq!(coeffs.len(), 2);

        encoder.configure(3, 2).unwrap();
        assert_eq!(encoder.rank(), 0);
        encoder.set_symbols(&[9, 10, 11, 12, 13, 14]).unwrap();
        let (coeffs, symbol) = encoder.encode_packet().unwrap();
        assert_eq!(coeffs.len(), 3);
        assert_eq!(symbol.len(), 2);
    }

    #[test]
    fn test_encoder_stress_large_data() {
        let mut encoder = RlnEncoder::<GF256>::new();
        let symbols = 100;
        let symbol_size = 1024;

        encoder.configure(symbols, symbol_size).unwrap();
        encoder.set_symbols(&vec![0u8; symbols * symbol_size]).unwrap();

        let (coeffs, symbol) = encoder.encode_packet().unwrap();
        assert_eq!(coeffs.len(), symbols);
        assert_eq!(symbol.len(), symbol_size);
    }

    #[test]
    fn test_single_coefficient_selects_symbol() {
        let mut encoder = RlnEncoder::<GF256>::new();
        let symbols = 32;
        let symbol_size = 64;
        encoder.configure(symbols, symbol_size).unwrap();

        let mut data = vec![0u8; symbols * symbol_size];
        data[0] = 1;
        encoder.set_symbols(&data).unwrap();

        let coeffs = CoefficientVector::<GF256>::unit(symbols, 0);
        let result = encoder.encode_symbol(&coeffs).unwrap();
        assert_eq!(result[0], 1);
        assert!(result[1..].iter().all(|&byte| byte == 0));
    }
}
