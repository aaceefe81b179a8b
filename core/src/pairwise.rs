//! Pairwise bigram table and greedy nearest-neighbor reconstruction.
//!
//! Builds an n x n matrix of bigram probabilities over the input multiset
//! and walks it greedily: from the current token, always step to the
//! highest-probability successor that has not been consumed. The tour never
//! backtracks and is not globally optimal.

use crate::counts::{CountProvider, Token};
use crate::error::{Result, UnscrambleError};
use crate::model::NgramModel;
use tracing::debug;

/// Sentinel marking an unusable cell: the diagonal, a duplicate-token pair,
/// or a column already consumed by the walk.
pub const INVALID: f64 = -1.0;

/// Row-major n x n matrix of bigram probabilities for one input multiset.
///
/// Built fresh per reconstruction call and discarded afterward.
#[derive(Debug, Clone)]
pub struct PairTable {
    n: usize,
    cells: Vec<f64>,
}

impl PairTable {
    /// Build the table for `seq`: cell (x, y) holds the probability of the
    /// bigram (seq[x], seq[y]), or [`INVALID`] when x == y or the two
    /// positions hold equal tokens.
    pub fn build<P: CountProvider>(model: &NgramModel<P>, seq: &[Token]) -> Result<Self> {
        let n = seq.len();
        let mut cells = Vec::with_capacity(n * n);
        for x in 0..n {
            for y in 0..n {
                if x == y || seq[x] == seq[y] {
                    cells.push(INVALID);
                } else {
                    cells.push(model.probability(&[seq[x].clone(), seq[y].clone()])?);
                }
            }
        }
        Ok(Self { n, cells })
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[x * self.n + y]
    }

    /// Leftmost column holding the maximum value of `row`. The scan compares
    /// strictly, so ties resolve to the first-seen column.
    pub fn best_in_row(&self, row: usize) -> usize {
        let mut best = 0;
        let mut best_val = self.get(row, 0);
        for col in 1..self.n {
            let val = self.get(row, col);
            if val > best_val {
                best = col;
                best_val = val;
            }
        }
        best
    }

    /// Mark `col` unusable in every row; the token at that position can no
    /// longer be chosen as a successor.
    pub fn invalidate_column(&mut self, col: usize) {
        for row in 0..self.n {
            self.cells[row * self.n + col] = INVALID;
        }
    }
}

/// Greedy nearest-neighbor tour over the pairwise table.
///
/// Starts at the first input token and repeatedly appends the most probable
/// successor of the current one, invalidating the column of each token as it
/// is left behind so the walk cannot return to it. The result is a
/// permutation of `seq` beginning with `seq[0]`; a single-token input comes
/// back unchanged.
pub fn reconstruct<P: CountProvider>(model: &NgramModel<P>, seq: &[Token]) -> Result<Vec<Token>> {
    if seq.is_empty() {
        return Err(UnscrambleError::invalid_input(
            "cannot reconstruct an empty sequence",
        ));
    }

    let n = seq.len();
    let mut table = PairTable::build(model, seq)?;

    let mut result = Vec::with_capacity(n);
    result.push(seq[0].clone());
    let mut row = 0;

    for _ in 0..n - 1 {
        let col = table.best_in_row(row);
        result.push(seq[col].clone());
        // the token we are leaving can never be chosen again
        table.invalidate_column(row);
        row = col;
    }

    debug!(len = n, "pairwise reconstruction complete");
    Ok(result)
}
