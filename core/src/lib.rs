//! unscramble-core
//!
//! Smoothed word n-gram language model (orders 1 through 4) and greedy
//! word-order reconstruction over an unordered bag of tokens.
//!
//! Counts come from a pluggable [`CountProvider`]: the bincode-backed
//! in-memory [`MemCountStore`] snapshot, the persistent redb-backed
//! [`RedbCountStore`], or a fabricated provider in tests. On top of the
//! add-one smoothed probability model sit two greedy reconstruction
//! strategies (a pairwise-table nearest-neighbor tour and a
//! trigram-overlap chain builder) and a best-of-candidates selector.
//!
//! Public API:
//! - `NgramModel` - probability model over an injected count source
//! - `CountProvider` - read-only count and vocabulary interface
//! - `MemCountStore` - in-memory snapshot store, trainable from a corpus
//! - `RedbCountStore` - persistent count database
//! - `Config` - scoring window and input normalization settings
use serde::{Deserialize, Serialize};

// Core modules
pub mod error;
pub use error::{Result, UnscrambleError};

pub mod counts;
pub use counts::{CountProvider, MemCountStore, Token, MAX_ORDER};

pub mod store;
pub use store::RedbCountStore;

pub mod model;
pub use model::NgramModel;

pub mod pairwise;
pub use pairwise::PairTable;

pub mod overlap;

pub mod selector;

/// Configuration for scoring and input handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Markov window width used by sentence scoring. Inputs shorter than
    /// the window are scored with bigram windows instead.
    pub window: usize,

    /// NFC-normalize and trim tokens ingested from corpora or typed input.
    pub normalize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: 3,
            normalize: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
