//! Incremental Gaussian elimination kept in fully reduced form

use crate::coding::traits::CodingError;
use crate::storage::symbol::{scale, subtract_scaled};
use crate::storage::{StatusBitmap, SymbolField};
use log::trace;

/// Decoding system of a generation.
///
/// Row `p` lives in slot `p` and exists only when `p` is a pivot column. Each
/// stored row has a one in its pivot column and zeros in every other pivot
/// column, and zeros left of its pivot. With all `K` rows present the
/// coefficient part is the identity and slot `i` holds source symbol `i`.
#[derive(Debug, Clone)]
pub struct DecodingMatrix<F: SymbolField> {
    /// Flat storage for coefficients (row-major, `symbols` per row)
    coefficients: Vec<F>,
    /// Flat storage for row data (`symbol_size` bytes per row)
    data: Vec<u8>,
    /// Number of columns (source symbols)
    symbols: usize,
    /// Bytes per row of data
    symbol_size: usize,
    /// Slots holding a row
    pivots: StatusBitmap,
    /// Current rank of the matrix
    rank: usize,
    /// Scratch space for the row being inserted
    scratch_coefficients: Vec<F>,
    scratch_data: Vec<u8>,
}

impl<F: SymbolField> DecodingMatrix<F> {
    /// Create an empty system for `symbols` columns of `symbol_size` bytes
    pub fn new(symbols: usize, symbol_size: usize) -> Self {
        let mut matrix = Self {
            coefficients: Vec::new(),
            data: Vec::new(),
            symbols: 0,
            symbol_size: 0,
            pivots: StatusBitmap::default(),
            rank: 0,
            scratch_coefficients: Vec::new(),
            scratch_data: Vec::new(),
        };
        matrix.configure(symbols, symbol_size);
        matrix
    }

    /// Resize for a new generation and clear every row
    pub fn configure(&mut self, symbols: usize, symbol_size: usize) {
        self.symbols = symbols;
        self.symbol_size = symbol_size;
        self.coefficients.clear();
        self.coefficients.resize(symbols * symbols, F::ZERO);
        self.data.clear();
        self.data.resize(symbols * symbol_size, 0);
        self.scratch_coefficients.clear();
        self.scratch_coefficients.resize(symbols, F::ZERO);
        self.scratch_data.clear();
        self.scratch_data.resize(symbol_size, 0);
        self.pivots.reset(symbols);
        self.rank = 0;
    }

    /// Clear the matrix and reset to initial state
    pub fn clear(&mut self) {
        self.coefficients.fill(F::ZERO);
        self.data.fill(0);
        self.pivots.clear();
        self.rank = 0;
    }

    /// Get the number of columns in the matrix
    #[inline]
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Bytes of data per row
    #[inline]
    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    /// Get the current rank of the matrix
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Check if the matrix is full rank
    #[inline]
    pub fn is_full_rank(&self) -> bool {
        self.symbols > 0 && self.rank == self.symbols
    }

    /// Slots holding a row
    #[inline]
    pub fn pivots(&self) -> &StatusBitmap {
        &self.pivots
    }

    /// Whether a row with leading column `col` is stored
    #[inline]
    pub fn is_pivot(&self, col: usize) -> bool {
        self.pivots.get(col)
    }

    /// Coefficients of the row stored in slot `row`
    #[inline]
    pub fn row_coefficients(&self, row: usize) -> &[F] {
        debug_assert!(row < self.symbols);
        &self.coefficients[row * self.symbols..(row + 1) * self.symbols]
    }

    /// Data of the row stored in slot `row`
    #[inline]
    pub fn row_data(&self, row: usize) -> &[u8] {
        debug_assert!(row < self.symbols);
        &self.data[row * self.symbol_size..(row + 1) * self.symbol_size]
    }

    /// Whether slot `row` holds the unit vector, i.e. source symbol `row`
    pub fn is_decoded(&self, row: usize) -> bool {
        if !self.is_pivot(row) {
            return false;
        }
        self.row_coefficients(row)
            .iter()
            .enumerate()
            .all(|(col, c)| col == row || c.is_zero())
    }

    /// Number of source symbols fully decoded
    pub fn symbols_decoded(&self) -> usize {
        self.pivots
            .iter_ones()
            .filter(|&row| self.is_decoded(row))
            .count()
    }

    /// Check if a new row would increase the rank
    pub fn check_rank_increase(&self, row_data: &[F]) -> bool {
        if row_data.len() != self.symbols || self.is_full_rank() {
            return false;
        }

        let mut transformed = row_data.to_vec();
        for col in self.pivots.iter_ones() {
            let factor = transformed[col];
            if factor.is_zero() {
                continue;
            }
            let pivot_row = &self.coefficients[col * self.symbols..(col + 1) * self.symbols];
            for (value, pivot_value) in transformed[col..].iter_mut().zip(&pivot_row[col..]) {
                *value = *value - *pivot_value * factor;
            }
        }

        transformed.iter().any(|c| !c.is_zero())
    }

    /// Eliminate `(coefficients, data)` against the stored rows and keep it
    /// if anything remains.
    ///
    /// Returns `Ok(true)` when the rank grew, `Ok(false)` when the row
    /// reduced to zero. Stored rows are untouched in the latter case.
    pub fn insert(&mut self, coefficients: &[F], data: &[u8]) -> Result<bool, CodingError> {
        debug_assert_eq!(coefficients.len(), self.symbols);
        debug_assert_eq!(data.len(), self.symbol_size);

        let k = self.symbols;
        let size = self.symbol_size;
        self.scratch_coefficients.copy_from_slice(coefficients);
        self.scratch_data.copy_from_slice(data);

        // Forward pass. Stored rows are zero in every other pivot column, so
        // one sweep in column order clears all pivot columns.
        for col in self.pivots.iter_ones() {
            let factor = self.scratch_coefficients[col];
            if factor.is_zero() {
                continue;
            }
            let pivot_row = &self.coefficients[col * k..(col + 1) * k];
            for (value, pivot_value) in self.scratch_coefficients[col..]
                .iter_mut()
                .zip(&pivot_row[col..])
            {
                *value = *value - *pivot_value * factor;
            }
            subtract_scaled(
                &mut self.scratch_data,
                &self.data[col * size..(col + 1) * size],
                factor,
            );
        }

        let Some(pivot) = self.scratch_coefficients.iter().position(|c| !c.is_zero()) else {
            trace!("redundant row discarded at rank {}", self.rank);
            return Ok(false);
        };
        debug_assert!(!self.is_pivot(pivot));

        let inverse = self.scratch_coefficients[pivot]
            .invert()
            .ok_or(CodingError::DecodingFailed)?;
        for value in &mut self.scratch_coefficients[pivot..] {
            *value *= inverse;
        }
        scale(&mut self.scratch_data, inverse);

        // Backward pass: clear the new pivot column from every stored row
        for row in self.pivots.iter_ones() {
            let start = row * k;
            let factor = self.coefficients[start + pivot];
            if factor.is_zero() {
                continue;
            }
            for (value, new_value) in self.coefficients[start + pivot..start + k]
                .iter_mut()
                .zip(&self.scratch_coefficients[pivot..])
            {
                *value = *value - *new_value * factor;
            }
            subtract_scaled(
                &mut self.data[row * size..(row + 1) * size],
                &self.scratch_data,
                factor,
            );
        }

        self.coefficients[pivot * k..(pivot + 1) * k].copy_from_slice(&self.scratch_coefficients);
        self.data[pivot * size..(pivot + 1) * size].copy_from_slice(&self.scratch_data);
        self.pivots.set(pivot);
        self.rank += 1;

        trace!("new pivot {} -> rank {}/{}", pivot, self.rank, k);
        Ok(true)
    }
}

impl<F: SymbolField> Default for DecodingMatrix<F> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
