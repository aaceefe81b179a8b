//! Trigram overlap-chain reconstruction.
//!
//! Scores every ordered triple of pairwise-distinct tokens from the input,
//! then stitches a chain of trigrams in which each entry shares its first
//! two tokens with the previous entry's last two. The chain grows one token
//! per step and never reuses a token outside the overlap positions.

use crate::counts::{CountProvider, Token};
use crate::error::Result;
use crate::model::NgramModel;
use ahash::AHashSet;
use tracing::debug;

/// One scored trigram: three pairwise-distinct tokens and their smoothed
/// probability.
type ScoredTriple = ((Token, Token, Token), f64);

/// Enumerate and score every ordered triple of pairwise-distinct tokens
/// from `seq`, in ascending `(i, j, k)` position order.
///
/// Position triples that collapse to the same token triple score
/// identically, so only the first occurrence is kept; the list order is the
/// deterministic generation order and every later selection scans it
/// front-to-back.
fn score_triples<P: CountProvider>(
    model: &NgramModel<P>,
    seq: &[Token],
) -> Result<Vec<ScoredTriple>> {
    let n = seq.len();
    let mut triples: Vec<ScoredTriple> = Vec::new();
    let mut seen: AHashSet<(Token, Token, Token)> = AHashSet::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let key = (seq[i].clone(), seq[j].clone(), seq[k].clone());
                if key.0 == key.1 || key.0 == key.2 || key.1 == key.2 {
                    continue;
                }
                if !seen.insert(key.clone()) {
                    continue;
                }
                let p = model.probability(&[key.0.clone(), key.1.clone(), key.2.clone()])?;
                triples.push((key, p));
            }
        }
    }
    Ok(triples)
}

/// Reconstruct an ordering by chaining trigrams with 2-token overlaps.
///
/// The start trigram is the best-scoring triple beginning with the first
/// input token. Each step extends the chain with the best-scoring remaining
/// triple whose first two tokens match the previous entry's last two and
/// whose third token has not been placed yet. The match scan completes
/// before the chosen entry is removed, so equally scored losers stay
/// available for later steps. Ties always resolve to the earliest generated
/// triple.
///
/// Inputs shorter than three tokens, or whose first token never opens a
/// valid triple, come back unchanged. A chain that stalls before placing
/// every token yields a partial ordering.
pub fn reconstruct<P: CountProvider>(model: &NgramModel<P>, seq: &[Token]) -> Result<Vec<Token>> {
    if seq.is_empty() {
        return Ok(Vec::new());
    }

    let mut triples = score_triples(model, seq)?;

    // best-scoring triple opening with the first input token; strict
    // comparison keeps the earliest on ties
    let mut start: Option<usize> = None;
    let mut best = -1.0;
    for (idx, ((a, _, _), p)) in triples.iter().enumerate() {
        if a == &seq[0] && *p > best {
            best = *p;
            start = Some(idx);
        }
    }
    let Some(start_idx) = start else {
        debug!("no trigram opens with the leading token; returning input unchanged");
        return Ok(seq.to_vec());
    };

    let mut prev = triples[start_idx].0.clone();
    let mut ordering: Vec<Token> = vec![prev.0.clone(), prev.1.clone(), prev.2.clone()];
    let mut closed: AHashSet<Token> = AHashSet::new();
    closed.insert(prev.0.clone());
    closed.insert(prev.1.clone());
    closed.insert(prev.2.clone());

    for _ in 0..seq.len().saturating_sub(3) {
        // two-phase: find the best match over the whole list first, remove
        // only the chosen entry after
        let mut chosen: Option<(usize, f64)> = None;
        for (idx, ((a, b, c), p)) in triples.iter().enumerate() {
            if (a, b) == (&prev.1, &prev.2) && !closed.contains(c) {
                match chosen {
                    Some((_, cp)) if *p <= cp => {}
                    _ => chosen = Some((idx, *p)),
                }
            }
        }
        let Some((idx, score)) = chosen else {
            break;
        };
        let (key, _) = triples.remove(idx);
        debug!(score, "extending overlap chain");
        closed.insert(key.2.clone());
        ordering.push(key.2.clone());
        prev = key;
    }

    Ok(ordering)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::MemCountStore;

    fn toks(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn model() -> NgramModel<MemCountStore> {
        let mut store = MemCountStore::new();
        for w in ["the", "cat", "sat", "on", "mat"] {
            store.insert_count(&toks(&[w]), 5);
        }
        store.insert_count(&toks(&["the", "cat"]), 4);
        store.insert_count(&toks(&["cat", "sat"]), 3);
        store.insert_count(&toks(&["sat", "on"]), 3);
        store.insert_count(&toks(&["on", "mat"]), 2);
        store.insert_count(&toks(&["the", "cat", "sat"]), 2);
        store.insert_count(&toks(&["cat", "sat", "on"]), 2);
        store.insert_count(&toks(&["sat", "on", "mat"]), 1);
        NgramModel::new(store)
    }

    #[test]
    fn triples_are_distinct_and_generated_in_order() {
        let m = model();
        let seq = toks(&["the", "cat", "the"]);
        let triples = score_triples(&m, &seq).unwrap();
        // the duplicate "the" leaves no triple of three distinct tokens
        assert!(triples.is_empty());

        let seq = toks(&["the", "cat", "sat"]);
        let triples = score_triples(&m, &seq).unwrap();
        assert_eq!(triples.len(), 6);
        // ascending (i, j, k) generation order
        assert_eq!(
            triples[0].0,
            ("the".to_string(), "cat".to_string(), "sat".to_string())
        );
        for ((a, b, c), _) in &triples {
            assert!(a != b && a != c && b != c);
        }
    }

    #[test]
    fn chain_entries_overlap_by_two_tokens() {
        let m = model();
        let seq = toks(&["sat", "the", "on", "cat", "mat"]);
        let out = reconstruct(&m, &seq).unwrap();
        // every consecutive token pair in the output is a 2-token overlap
        // of two chained trigrams, so no token repeats
        let mut dedup = out.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), out.len());
        assert_eq!(out[0], "sat");
    }

    #[test]
    fn strong_trigrams_reassemble_the_sentence() {
        let m = model();
        let out = reconstruct(&m, &toks(&["the", "sat", "cat", "mat", "on"])).unwrap();
        assert_eq!(out, toks(&["the", "cat", "sat", "on", "mat"]));
    }

    #[test]
    fn short_inputs_come_back_unchanged() {
        let m = model();
        assert_eq!(reconstruct(&m, &[]).unwrap(), Vec::<Token>::new());
        assert_eq!(reconstruct(&m, &toks(&["cat"])).unwrap(), toks(&["cat"]));
        assert_eq!(
            reconstruct(&m, &toks(&["cat", "the"])).unwrap(),
            toks(&["cat", "the"])
        );
    }

    #[test]
    fn all_duplicate_tokens_fall_back_to_identity() {
        let m = model();
        let seq = toks(&["cat", "cat", "cat"]);
        assert_eq!(reconstruct(&m, &seq).unwrap(), seq);
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let m = model();
        let seq = toks(&["mat", "cat", "on", "the", "sat"]);
        let first = reconstruct(&m, &seq).unwrap();
        let second = reconstruct(&m, &seq).unwrap();
        assert_eq!(first, second);
    }
}
