//! Count sources for the n-gram model.
//!
//! The model never owns raw counts; it borrows them from a [`CountProvider`].
//! Two backends implement the trait: [`MemCountStore`] here (hash tables,
//! trainable from a corpus, serialized as a bincode snapshot) and the
//! persistent [`crate::RedbCountStore`]. Tests supply their own fabricated
//! providers through the same trait.

use ahash::AHashMap;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Token type used in count tables (a whitespace-delimited word).
pub type Token = String;

/// Highest n-gram order tracked by any count source.
pub const MAX_ORDER: usize = 4;

/// Read-only source of raw n-gram occurrence counts and vocabulary sizes.
///
/// Two conventions every implementation must honor:
///
/// - `count(&[])` returns the total token occurrence count. The unigram
///   probability denominator looks up this "empty prefix".
/// - `vocab_size(0)` returns the distinct unigram count.
///
/// `vocab_size` must never return 0 for an order the model queries; the
/// smoothing denominator is not defended against a collapsed vocabulary.
/// Populate the store before scoring.
pub trait CountProvider {
    /// Exact occurrence count of `seq`, 0 if never observed.
    fn count(&self, seq: &[Token]) -> u64;

    /// Aggregate occurrence count of all n-grams of `order`.
    fn total(&self, order: usize) -> u64;

    /// Number of distinct n-grams of `order`.
    fn vocab_size(&self, order: usize) -> u64;
}

/// In-memory count store with one hash table per order, plus per-order
/// occurrence totals.
///
/// Trained by sliding windows over tokenized sentences, or populated
/// directly with [`MemCountStore::insert_count`]. The whole store
/// round-trips through a bincode snapshot so start-up does not have to
/// re-read the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemCountStore {
    unigrams: AHashMap<Token, u64>,
    bigrams: AHashMap<(Token, Token), u64>,
    trigrams: AHashMap<(Token, Token, Token), u64>,
    quadgrams: AHashMap<(Token, Token, Token, Token), u64>,
    /// totals[k-1] = total occurrences of k-grams
    totals: [u64; MAX_ORDER],
}

impl MemCountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every n-gram window (orders 1 through 4) of one tokenized
    /// sentence.
    pub fn train(&mut self, tokens: &[Token]) {
        for t in tokens {
            *self.unigrams.entry(t.clone()).or_insert(0) += 1;
            self.totals[0] += 1;
        }
        for w in tokens.windows(2) {
            *self
                .bigrams
                .entry((w[0].clone(), w[1].clone()))
                .or_insert(0) += 1;
            self.totals[1] += 1;
        }
        for w in tokens.windows(3) {
            *self
                .trigrams
                .entry((w[0].clone(), w[1].clone(), w[2].clone()))
                .or_insert(0) += 1;
            self.totals[2] += 1;
        }
        for w in tokens.windows(4) {
            *self
                .quadgrams
                .entry((w[0].clone(), w[1].clone(), w[2].clone(), w[3].clone()))
                .or_insert(0) += 1;
            self.totals[3] += 1;
        }
    }

    /// Add `count` occurrences of one exact n-gram. Used by the corpus tools
    /// and by tests that pin counts by hand.
    pub fn insert_count(&mut self, seq: &[Token], count: u64) {
        match seq {
            [a] => {
                *self.unigrams.entry(a.clone()).or_insert(0) += count;
            }
            [a, b] => {
                *self.bigrams.entry((a.clone(), b.clone())).or_insert(0) += count;
            }
            [a, b, c] => {
                *self
                    .trigrams
                    .entry((a.clone(), b.clone(), c.clone()))
                    .or_insert(0) += count;
            }
            [a, b, c, d] => {
                *self
                    .quadgrams
                    .entry((a.clone(), b.clone(), c.clone(), d.clone()))
                    .or_insert(0) += count;
            }
            _ => panic!("n-gram order must be 1..={}", MAX_ORDER),
        }
        self.totals[seq.len() - 1] += count;
    }

    /// Iterate every stored n-gram with its count, lowest order first.
    pub fn iter_counts(&self) -> impl Iterator<Item = (Vec<Token>, u64)> + '_ {
        let unigrams = self.unigrams.iter().map(|(a, c)| (vec![a.clone()], *c));
        let bigrams = self
            .bigrams
            .iter()
            .map(|((a, b), c)| (vec![a.clone(), b.clone()], *c));
        let trigrams = self
            .trigrams
            .iter()
            .map(|((a, b, c), n)| (vec![a.clone(), b.clone(), c.clone()], *n));
        let quadgrams = self
            .quadgrams
            .iter()
            .map(|((a, b, c, d), n)| (vec![a.clone(), b.clone(), c.clone(), d.clone()], *n));
        unigrams.chain(bigrams).chain(trigrams).chain(quadgrams)
    }

    // --- Serialization helpers ---

    /// Save the store to the given path using bincode.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating count snapshot {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self).context("serializing count snapshot")?;
        Ok(())
    }

    /// Load the store from a bincode snapshot.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening count snapshot {}", path.display()))?;
        let reader = BufReader::new(file);
        let store: Self =
            bincode::deserialize_from(reader).context("deserializing count snapshot")?;
        info!(
            path = %path.display(),
            unigrams = store.unigrams.len(),
            "loaded count snapshot"
        );
        Ok(store)
    }
}

impl CountProvider for MemCountStore {
    fn count(&self, seq: &[Token]) -> u64 {
        match seq {
            // empty prefix convention: total token occurrences
            [] => self.totals[0],
            [a] => self.unigrams.get(a).copied().unwrap_or(0),
            [a, b] => self
                .bigrams
                .get(&(a.clone(), b.clone()))
                .copied()
                .unwrap_or(0),
            [a, b, c] => self
                .trigrams
                .get(&(a.clone(), b.clone(), c.clone()))
                .copied()
                .unwrap_or(0),
            [a, b, c, d] => self
                .quadgrams
                .get(&(a.clone(), b.clone(), c.clone(), d.clone()))
                .copied()
                .unwrap_or(0),
            _ => 0,
        }
    }

    fn total(&self, order: usize) -> u64 {
        if order == 0 || order > MAX_ORDER {
            0
        } else {
            self.totals[order - 1]
        }
    }

    fn vocab_size(&self, order: usize) -> u64 {
        match order {
            // order 0 is defined as the distinct unigram count
            0 | 1 => self.unigrams.len() as u64,
            2 => self.bigrams.len() as u64,
            3 => self.trigrams.len() as u64,
            4 => self.quadgrams.len() as u64,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn train_counts_all_orders() {
        let mut store = MemCountStore::new();
        store.train(&toks(&["the", "cat", "sat", "down"]));

        assert_eq!(store.count(&toks(&["cat"])), 1);
        assert_eq!(store.count(&toks(&["the", "cat"])), 1);
        assert_eq!(store.count(&toks(&["the", "cat", "sat"])), 1);
        assert_eq!(store.count(&toks(&["the", "cat", "sat", "down"])), 1);
        assert_eq!(store.count(&toks(&["sat", "cat"])), 0);

        // 4 unigrams, 3 bigrams, 2 trigrams, 1 quadgram
        assert_eq!(store.total(1), 4);
        assert_eq!(store.total(2), 3);
        assert_eq!(store.total(3), 2);
        assert_eq!(store.total(4), 1);
    }

    #[test]
    fn empty_prefix_is_total_token_count() {
        let mut store = MemCountStore::new();
        store.train(&toks(&["a", "b", "a"]));
        // count of the empty sequence is the total occurrence count, not 0
        assert_eq!(store.count(&[]), 3);
        assert_eq!(store.count(&[]), store.total(1));
    }

    #[test]
    fn vocab_size_zero_is_distinct_unigrams() {
        let mut store = MemCountStore::new();
        store.train(&toks(&["a", "b", "a", "c"]));
        assert_eq!(store.vocab_size(0), 3);
        assert_eq!(store.vocab_size(0), store.vocab_size(1));
        assert_eq!(store.vocab_size(2), 3);
    }

    #[test]
    fn insert_count_accumulates() {
        let mut store = MemCountStore::new();
        store.insert_count(&toks(&["the"]), 10);
        store.insert_count(&toks(&["the"]), 5);
        store.insert_count(&toks(&["the", "cat"]), 4);

        assert_eq!(store.count(&toks(&["the"])), 15);
        assert_eq!(store.total(1), 15);
        assert_eq!(store.count(&toks(&["the", "cat"])), 4);
        assert_eq!(store.total(2), 4);
    }

    #[test]
    fn bincode_roundtrip_preserves_counts() {
        let mut store = MemCountStore::new();
        store.train(&toks(&["the", "cat", "sat"]));
        store.train(&toks(&["the", "dog", "sat"]));

        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("unscramble_test_counts_{}.bincode", stamp));

        store.save_bincode(&path).expect("save");
        let loaded = MemCountStore::load_bincode(&path).expect("load");

        assert_eq!(loaded.count(&toks(&["the"])), 2);
        assert_eq!(loaded.count(&toks(&["the", "cat"])), 1);
        assert_eq!(loaded.total(1), store.total(1));
        assert_eq!(loaded.vocab_size(2), store.vocab_size(2));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn iter_counts_covers_every_order() {
        let mut store = MemCountStore::new();
        store.train(&toks(&["a", "b", "c", "d"]));
        let items: Vec<(Vec<Token>, u64)> = store.iter_counts().collect();
        // 4 unigrams + 3 bigrams + 2 trigrams + 1 quadgram
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|(_, c)| *c == 1));
    }
}
