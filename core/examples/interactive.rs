//! Interactive word-order reconstruction.
//!
//! Loads a count snapshot (path argument, default `data/counts.bincode`),
//! reads a whitespace-tokenized line from stdin, prints the reconstructed
//! ordering and its chained probability. `exit` quits.

use std::io::{self, BufRead, Write};
use unscramble_core::{utils, Config, MemCountStore, NgramModel};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/counts.bincode".to_string());
    let store = MemCountStore::load_bincode(&path)?;
    println!("✓ Loaded count snapshot from '{}'", path);

    let cfg = Config::default();
    let model = NgramModel::with_config(store, cfg.clone());

    let stdin = io::stdin();
    loop {
        print!("enter sequence of words: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

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

        let ordering = model.reconstruct_overlap(&tokens)?;
        println!("{}", ordering.join(" "));
        println!(
            "prob : {}",
            model.sentence_probability(&ordering, cfg.window)?
        );
    }

    Ok(())
}
