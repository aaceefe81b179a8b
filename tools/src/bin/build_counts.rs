use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use unscramble_core::{utils, Config, CountProvider, MemCountStore};

/// Train an n-gram count snapshot from corpus text files (one sentence per
/// line, whitespace tokens) and serialize it with bincode.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: build_counts <corpus-file> [more files...]\nOutputs to data/counts.bincode");
        std::process::exit(1);
    }

    let cfg = Config::default();
    let mut store = MemCountStore::new();

    for path in &args[1..] {
        let f = File::open(path).with_context(|| format!("open {}", path))?;
        let reader = BufReader::new(f);
        for line in reader.lines() {
            let line = line?;
            let tokens: Vec<String> = line
                .split_whitespace()
                .map(|w| {
                    if cfg.normalize {
                        utils::normalize(w)
                    } else {
                        w.to_string()
                    }
                })
                .filter(|w| !w.is_empty())
                .collect();
            if tokens.is_empty() {
                continue;
            }
            store.train(&tokens);
        }
    }

    std::fs::create_dir_all("data").context("create data dir")?;
    store.save_bincode("data/counts.bincode")?;
    println!(
        "wrote data/counts.bincode ({} distinct unigrams, {} tokens)",
        store.vocab_size(1),
        store.total(1)
    );
    Ok(())
}
