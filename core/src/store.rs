//! Persistent n-gram count store backed by redb.
//!
//! One table per order plus a meta table holding the aggregate occurrence
//! total of each order. Increments run in write transactions, lookups in
//! read transactions, so concurrent readers need no extra locking.

use crate::counts::{CountProvider, MemCountStore, Token, MAX_ORDER};
use redb::{ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use tracing::info;

/// Separator joining tokens into a single table key. Tokens are
/// whitespace-delimited words and can never contain it.
const KEY_SEP: &str = "\u{1f}";

fn join_key(seq: &[Token]) -> String {
    seq.join(KEY_SEP)
}

fn total_key(order: usize) -> String {
    format!("total.{}", order)
}

/// Redb-backed count store satisfying the [`CountProvider`] contract.
///
/// The inherent methods expose I/O failures as `redb::Error`; the trait
/// implementation falls back to 0 on error, matching the "unseen" reading
/// of a missing key.
pub struct RedbCountStore {
    db: redb::Database,
    #[allow(dead_code)]
    path: std::path::PathBuf,
}

impl RedbCountStore {
    /// One table per n-gram order, keyed by the joined token string.
    const ORDER_TABLES: [TableDefinition<'static, &'static str, u64>; MAX_ORDER] = [
        TableDefinition::new("unigram"),
        TableDefinition::new("bigram"),
        TableDefinition::new("trigram"),
        TableDefinition::new("quadgram"),
    ];

    /// Aggregate occurrence totals, keyed `total.<order>`.
    const META: TableDefinition<'static, &'static str, u64> = TableDefinition::new("meta");

    /// Create or open a count database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, redb::Error> {
        if let Some(parent) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let db = redb::Database::create(path.as_ref())?;

        // create every table up front so first reads do not fail
        let txn = db.begin_write()?;
        for def in Self::ORDER_TABLES {
            txn.open_table(def)?;
        }
        txn.open_table(Self::META)?;
        txn.commit()?;

        info!(path = %path.as_ref().display(), "opened count database");
        Ok(RedbCountStore {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Add `delta` occurrences of `seq`, updating the aggregate total for
    /// its order.
    pub fn insert_count(&self, seq: &[Token], delta: u64) -> Result<(), redb::Error> {
        assert!(
            (1..=MAX_ORDER).contains(&seq.len()),
            "n-gram order must be 1..={}",
            MAX_ORDER
        );
        let key = join_key(seq);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(Self::ORDER_TABLES[seq.len() - 1])?;
            let current = table.get(key.as_str())?.map(|v| v.value()).unwrap_or(0);
            table.insert(key.as_str(), &current.saturating_add(delta))?;
        }
        {
            let mut meta = txn.open_table(Self::META)?;
            let tk = total_key(seq.len());
            let current = meta.get(tk.as_str())?.map(|v| v.value()).unwrap_or(0);
            meta.insert(tk.as_str(), &current.saturating_add(delta))?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Bulk-import every count from an in-memory snapshot in one
    /// transaction.
    pub fn import(&self, snapshot: &MemCountStore) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        for order in 1..=MAX_ORDER {
            let mut table = txn.open_table(Self::ORDER_TABLES[order - 1])?;
            for (seq, count) in snapshot.iter_counts().filter(|(s, _)| s.len() == order) {
                let key = join_key(&seq);
                let current = table.get(key.as_str())?.map(|v| v.value()).unwrap_or(0);
                table.insert(key.as_str(), &current.saturating_add(count))?;
            }
        }
        {
            let mut meta = txn.open_table(Self::META)?;
            for order in 1..=MAX_ORDER {
                let tk = total_key(order);
                let current = meta.get(tk.as_str())?.map(|v| v.value()).unwrap_or(0);
                meta.insert(tk.as_str(), &current.saturating_add(snapshot.total(order)))?;
            }
        }
        txn.commit()?;
        info!("imported count snapshot");
        Ok(())
    }

    /// Exact count of `seq`; the empty sequence reads the unigram total.
    pub fn get(&self, seq: &[Token]) -> Result<u64, redb::Error> {
        if seq.is_empty() {
            return self.total_for(1);
        }
        if seq.len() > MAX_ORDER {
            return Ok(0);
        }
        let txn = self.db.begin_read()?;
        let table = txn.open_table(Self::ORDER_TABLES[seq.len() - 1])?;
        Ok(table
            .get(join_key(seq).as_str())?
            .map(|v| v.value())
            .unwrap_or(0))
    }

    /// Aggregate occurrence total of all n-grams of `order`.
    pub fn total_for(&self, order: usize) -> Result<u64, redb::Error> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(Self::META)?;
        Ok(meta
            .get(total_key(order).as_str())?
            .map(|v| v.value())
            .unwrap_or(0))
    }

    /// Distinct n-gram count of `order`; order 0 reads the unigram table.
    pub fn vocab_for(&self, order: usize) -> Result<u64, redb::Error> {
        let order = if order == 0 { 1 } else { order };
        if order > MAX_ORDER {
            return Ok(0);
        }
        let txn = self.db.begin_read()?;
        let table = txn.open_table(Self::ORDER_TABLES[order - 1])?;
        Ok(table.len()?)
    }
}

impl CountProvider for RedbCountStore {
    fn count(&self, seq: &[Token]) -> u64 {
        self.get(seq).unwrap_or(0)
    }

    fn total(&self, order: usize) -> u64 {
        self.total_for(order).unwrap_or(0)
    }

    fn vocab_size(&self, order: usize) -> u64 {
        self.vocab_for(order).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn temp_db(tag: &str) -> std::path::PathBuf {
        let stamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("unscramble_test_{}_{}.redb", tag, stamp));
        path
    }

    #[test]
    fn insert_and_get_counts() {
        let path = temp_db("insert");
        let store = RedbCountStore::new(&path).expect("create db");

        store.insert_count(&toks(&["the"]), 10).expect("insert");
        store.insert_count(&toks(&["the"]), 5).expect("insert");
        store.insert_count(&toks(&["the", "cat"]), 4).expect("insert");

        assert_eq!(store.get(&toks(&["the"])).unwrap(), 15);
        assert_eq!(store.get(&toks(&["the", "cat"])).unwrap(), 4);
        assert_eq!(store.get(&toks(&["cat", "the"])).unwrap(), 0);
        assert_eq!(store.total_for(1).unwrap(), 15);
        assert_eq!(store.total_for(2).unwrap(), 4);
        assert_eq!(store.vocab_for(1).unwrap(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn provider_conventions_hold() {
        let path = temp_db("conv");
        let store = RedbCountStore::new(&path).expect("create db");
        store.insert_count(&toks(&["a"]), 2).expect("insert");
        store.insert_count(&toks(&["b"]), 3).expect("insert");

        // empty prefix reads the unigram total, order 0 the unigram vocab
        assert_eq!(store.count(&[]), 5);
        assert_eq!(store.vocab_size(0), 2);
        assert_eq!(store.vocab_size(1), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn counts_survive_reopen() {
        let path = temp_db("reopen");
        {
            let store = RedbCountStore::new(&path).expect("create db");
            store.insert_count(&toks(&["cat", "sat"]), 7).expect("insert");
        }
        let store = RedbCountStore::new(&path).expect("reopen db");
        assert_eq!(store.get(&toks(&["cat", "sat"])).unwrap(), 7);
        assert_eq!(store.total_for(2).unwrap(), 7);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn import_snapshot_matches_source() {
        let mut mem = MemCountStore::new();
        mem.train(&toks(&["the", "cat", "sat"]));
        mem.train(&toks(&["the", "cat"]));

        let path = temp_db("import");
        let store = RedbCountStore::new(&path).expect("create db");
        store.import(&mem).expect("import");

        assert_eq!(store.count(&toks(&["the", "cat"])), 2);
        assert_eq!(store.count(&toks(&["the", "cat", "sat"])), 1);
        assert_eq!(store.total(1), mem.total(1));
        assert_eq!(store.total(2), mem.total(2));
        assert_eq!(store.vocab_size(1), mem.vocab_size(1));

        let _ = std::fs::remove_file(&path);
    }
}
