// core/src/selector.rs
//
// Candidate scoring and selection: map the overlap reconstructor over many
// inputs, or score a set of candidate orderings and keep the likeliest.

use crate::counts::{CountProvider, Token};
use crate::error::{Result, UnscrambleError};
use crate::model::NgramModel;
use crate::overlap;

/// Reconstruct each input multiset independently via the overlap path.
///
/// No state is shared between the calls; the inputs are free to repeat.
pub fn reconstruct_all<P: CountProvider>(
    model: &NgramModel<P>,
    seqs: &[Vec<Token>],
) -> Result<Vec<Vec<Token>>> {
    seqs.iter().map(|s| overlap::reconstruct(model, s)).collect()
}

/// Return the candidate ordering with the highest chained likelihood.
///
/// Every candidate is scored with the configured window. The running
/// comparison accepts equal scores, so of two equally likely candidates the
/// later-scanned one wins. An empty candidate list is an input error.
pub fn best_candidate<P: CountProvider>(
    model: &NgramModel<P>,
    candidates: &[Vec<Token>],
) -> Result<Vec<Token>> {
    let Some(first) = candidates.first() else {
        return Err(UnscrambleError::invalid_input("no candidates to choose from"));
    };

    let window = model.config().window;
    let mut best = first;
    let mut best_prob = model.sentence_probability(best, window)?;
    for cand in &candidates[1..] {
        let prob = model.sentence_probability(cand, window)?;
        if prob >= best_prob {
            best_prob = prob;
            best = cand;
        }
    }
    Ok(best.clone())
}
