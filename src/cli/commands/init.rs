//! Initialize the Koffan database.
//!
//! The database lives at `~/.koffan/data/koffan.db` unless `--db` or
//! `KOFFAN_DB` says otherwise. With `KOFFAN_TEST_DB=1` it goes to
//! `~/.koffan/test/koffan.db` instead.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::Context;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    lists: usize,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `Error::AlreadyInitialized` if the database exists and `force` is
/// not set, or an error if the file cannot be created.
pub fn execute(force: bool, ctx: &Context<'_>) -> Result<()> {
    let db_path = ctx.config()?.db_path;
    let lists = create_database(&db_path, force)?;

    if ctx.json {
        let output = InitOutput {
            database: db_path,
            lists,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !ctx.quiet {
        println!("Initialized Koffan database");
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: create a list with `koffan list create <name>`.");
    }

    Ok(())
}

/// Create the database file and apply the schema. Returns the number of lists.
fn create_database(db_path: &Path, force: bool) -> Result<usize> {
    if db_path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized {
                path: db_path.to_path_buf(),
            });
        }
        remove_database(db_path)?;
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let storage = SqliteStorage::open(db_path)?;
    Ok(storage.list_lists()?.len())
}

/// Remove a database together with its WAL side files.
fn remove_database(db_path: &Path) -> Result<()> {
    fs::remove_file(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = db_path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            fs::remove_file(side)?;
        }
    }
    Ok(())
}
