use anyhow::{Context, Result};
use std::env;
use unscramble_core::{MemCountStore, RedbCountStore};

/// Import a bincode count snapshot into a persistent redb count database.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: build_count_db <counts.bincode> <counts.redb>");
        std::process::exit(1);
    }

    let snapshot = MemCountStore::load_bincode(&args[1])?;
    let db = RedbCountStore::new(&args[2]).with_context(|| format!("create db {}", &args[2]))?;
    db.import(&snapshot).context("import snapshot")?;
    println!("imported snapshot '{}' into '{}'", args[1], args[2]);
    Ok(())
}
