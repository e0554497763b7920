//! Coefficient vector generation

use crate::coding::config::GeneratorKind;
use crate::coding::sparse::fill_sparse;
use crate::storage::{CoefficientVector, StatusBitmap, SymbolField};
use crate::utils::CodingRng;
use std::marker::PhantomData;

/// Which slots a generated vector may weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every slot of the generation
    Dense,
    /// Only slots the sender holds
    Partial,
    /// Slots the sender holds and the receiver has not resolved
    StatusAware,
}

impl Selection {
    /// Pick the selection for a sender holding `available` symbols, given
    /// the receiver status last reported (if any).
    ///
    /// Receiver feedback wins as soon as it reports a resolved symbol, unless
    /// the receiver already resolved everything the sender holds. Without
    /// feedback, a sender missing symbols restricts itself to what it has.
    pub fn choose(available: &StatusBitmap, remote: Option<&StatusBitmap>) -> Self {
        if let Some(remote) = remote {
            if remote.any() && available.iter_ones().any(|i| !remote.get(i)) {
                return Selection::StatusAware;
            }
        }
        if available.all() {
            Selection::Dense
        } else {
            Selection::Partial
        }
    }
}

/// Coefficient generator driven by a `CodingRng`
#[derive(Debug, Clone)]
pub struct CoeffGenerator<F: SymbolField> {
    kind: GeneratorKind,
    rng: CodingRng,
    positions: Vec<usize>,
    _marker: PhantomData<F>,
}

impl<F: SymbolField> CoeffGenerator<F> {
    /// Create a generator with a random key
    pub fn new(kind: GeneratorKind) -> Self {
        Self::with_rng(kind, CodingRng::new())
    }

    /// Create a generator from an explicit RNG
    pub fn with_rng(kind: GeneratorKind, rng: CodingRng) -> Self {
        Self {
            kind,
            rng,
            positions: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Create a generator keyed by `seed` when given, by entropy otherwise
    pub fn from_optional_seed(kind: GeneratorKind, seed: Option<[u8; 32]>) -> Self {
        match seed {
            Some(seed) => Self::with_rng(kind, CodingRng::from_seed(seed)),
            None => Self::new(kind),
        }
    }

    /// Fill every slot of `out`
    pub fn generate(&mut self, out: &mut CoefficientVector<F>) {
        Self::fill(&self.kind, &mut self.rng, &mut self.positions, out, |_| true);
    }

    /// Fill only the slots whose index satisfies `allowed`; the others are zero
    pub fn generate_masked(
        &mut self,
        out: &mut CoefficientVector<F>,
        allowed: impl Fn(usize) -> bool,
    ) {
        Self::fill(&self.kind, &mut self.rng, &mut self.positions, out, allowed);
    }

    /// Fill only the slots set in `available`
    pub fn generate_partial(&mut self, out: &mut CoefficientVector<F>, available: &StatusBitmap) {
        self.generate_masked(out, |i| available.get(i));
    }

    /// Fill the slots set in `available` and clear in `remote`
    pub fn generate_status_aware(
        &mut self,
        out: &mut CoefficientVector<F>,
        available: &StatusBitmap,
        remote: &StatusBitmap,
    ) {
        self.generate_masked(out, |i| available.get(i) && !remote.get(i));
    }

    /// Fill `out` according to `Selection::choose`, returning the selection used
    pub fn generate_for(
        &mut self,
        out: &mut CoefficientVector<F>,
        available: &StatusBitmap,
        remote: Option<&StatusBitmap>,
    ) -> Selection {
        let selection = Selection::choose(available, remote);
        match (selection, remote) {
            (Selection::StatusAware, Some(remote)) => {
                self.generate_status_aware(out, available, remote)
            }
            (Selection::Dense, _) => self.generate(out),
            _ => self.generate_partial(out, available),
        }
        selection
    }

    /// Regenerate the vector identified by `seed`.
    ///
    /// Depends only on `seed`, the vector length and the distribution, never
    /// on the generator's own stream.
    pub fn generate_seeded(&mut self, seed: u32, out: &mut CoefficientVector<F>) {
        let mut rng = CodingRng::from_packet_seed(seed);
        Self::fill(&self.kind, &mut rng, &mut self.positions, out, |_| true);
    }

    fn fill(
        kind: &GeneratorKind,
        rng: &mut CodingRng,
        positions: &mut Vec<usize>,
        out: &mut CoefficientVector<F>,
        allowed: impl Fn(usize) -> bool,
    ) {
        let values = out.as_mut_slice();
        match kind {
            GeneratorKind::Uniform => {
                // Every slot is drawn so the stream position does not depend
                // on the mask.
                for (i, slot) in values.iter_mut().enumerate() {
                    let coefficient = rng.generate_coefficient::<F>();
                    *slot = if allowed(i) { coefficient } else { F::ZERO };
                }
            }
            GeneratorKind::Sparse(config) => {
                values.fill(F::ZERO);
                positions.clear();
                positions.extend((0..values.len()).filter(|&i| allowed(i)));
                fill_sparse(rng, config, positions, values);
            }
            GeneratorKind::Perpetual { width } => {
                values.fill(F::ZERO);
                positions.clear();
                positions.extend((0..values.len()).filter(|&i| allowed(i)));
                fill_perpetual(rng, *width, positions, values, &allowed);
            }
        }
    }
}

/// Unit pivot at a random allowed slot, then `width` uniform slots following
/// it, wrapping past the end. Slots outside the mask stay zero.
fn fill_perpetual<F: SymbolField>(
    rng: &mut CodingRng,
    width: usize,
    positions: &[usize],
    out: &mut [F],
    allowed: impl Fn(usize) -> bool,
) {
    if positions.is_empty() {
        return;
    }
    let symbols = out.len();
    let pivot = positions[rng.generate_index(positions.len())];
    out[pivot] = F::ONE;

    // The band never wraps back onto the pivot
    for offset in 1..=width.min(symbols - 1) {
        let index = (pivot + offset) % symbols;
        let coefficient = rng.generate_coefficient::<F>();
        if allowed(index) {
            out[index] = coefficient;
        }
    }
}
