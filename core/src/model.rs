//! Smoothed probability model over an injected count source.

use crate::counts::{CountProvider, Token, MAX_ORDER};
use crate::error::{Result, UnscrambleError};
use crate::{overlap, pairwise, selector, Config};

/// Statistical n-gram model: add-one smoothed conditional probabilities and
/// chained sentence likelihoods over a read-only [`CountProvider`].
///
/// The model holds no mutable state of its own; every reconstruction call
/// builds its working tables from scratch and discards them, so a model
/// backed by a concurrently readable provider can serve parallel calls.
#[derive(Debug, Clone)]
pub struct NgramModel<P> {
    provider: P,
    config: Config,
}

impl<P: CountProvider> NgramModel<P> {
    /// Create a model with the default configuration.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: Config::default(),
        }
    }

    /// Create a model with a specific configuration.
    pub fn with_config(provider: P, config: Config) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Raw occurrence count of `seq`.
    ///
    /// With `total` set, returns the aggregate count of all n-grams of the
    /// same order; the content of `seq` is ignored, only its length matters.
    pub fn count(&self, seq: &[Token], total: bool) -> u64 {
        assert!(
            seq.len() <= MAX_ORDER,
            "n-gram order {} exceeds {}",
            seq.len(),
            MAX_ORDER
        );
        if total {
            self.provider.total(seq.len())
        } else {
            self.provider.count(seq)
        }
    }

    /// Add-one smoothed probability of `seq`.
    ///
    /// For `seq = prefix + [w]` this is
    /// `(count(seq) + 1) / (count(prefix) + vocab_size(prefix order))`,
    /// strictly positive even for unseen n-grams and at most 1. The unigram
    /// case divides by the total token occurrence count plus the distinct
    /// unigram count, via the empty-prefix convention of [`CountProvider`].
    pub fn probability(&self, seq: &[Token]) -> Result<f64> {
        if seq.is_empty() {
            return Err(UnscrambleError::invalid_input(
                "probability of an empty sequence",
            ));
        }
        if seq.len() > MAX_ORDER {
            return Err(UnscrambleError::invalid_input(format!(
                "n-gram order {} exceeds {}",
                seq.len(),
                MAX_ORDER
            )));
        }
        let prefix = &seq[..seq.len() - 1];
        let seen = self.provider.count(seq);
        let prior = self.provider.count(prefix);
        let vocab = self.provider.vocab_size(prefix.len());
        Ok((seen + 1) as f64 / (prior + vocab) as f64)
    }

    /// Markov-chain likelihood of a full ordering: the product of
    /// [`Self::probability`] over every width-`n` window, sliding by one.
    ///
    /// `n` clamps to 2 when the input is shorter than the window; an input
    /// with no full window at all (0 or 1 tokens) multiplies over nothing
    /// and yields 1.0. The product is computed in linear space, so very
    /// long inputs underflow toward zero; acceptable for the short
    /// sentences this model targets.
    pub fn sentence_probability(&self, seq: &[Token], n: usize) -> Result<f64> {
        let n = if seq.len() < n { 2 } else { n };
        if n == 0 {
            return Err(UnscrambleError::invalid_input("zero-width scoring window"));
        }
        let mut prob = 1.0;
        for window in seq.windows(n) {
            prob *= self.probability(window)?;
        }
        Ok(prob)
    }

    /// Greedy nearest-neighbor reconstruction over the pairwise bigram
    /// table. See [`crate::pairwise`].
    pub fn reconstruct_pairwise(&self, seq: &[Token]) -> Result<Vec<Token>> {
        pairwise::reconstruct(self, seq)
    }

    /// Trigram overlap-chain reconstruction. See [`crate::overlap`].
    pub fn reconstruct_overlap(&self, seq: &[Token]) -> Result<Vec<Token>> {
        overlap::reconstruct(self, seq)
    }

    /// Reconstruct each input multiset independently via the overlap path.
    pub fn reconstruct_all(&self, seqs: &[Vec<Token>]) -> Result<Vec<Vec<Token>>> {
        selector::reconstruct_all(self, seqs)
    }

    /// The candidate ordering with the highest chained likelihood. See
    /// [`crate::selector`].
    pub fn best_candidate(&self, candidates: &[Vec<Token>]) -> Result<Vec<Token>> {
        selector::best_candidate(self, candidates)
    }
}
