// src/db/mod.rs

//! SQLite persistence for students, assignments and submissions
//!
//! The server keeps everything in memory and writes through to this
//! database, which is only read in full at startup.

pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::info;

/// Create the database (and its parent directories) and apply migrations
pub fn init(db_path: impl AsRef<Path>) -> Result<()> {
    let db_path = db_path.as_ref();
    info!("Initializing database at: {}", db_path.display());

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::InitError(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let conn = open(db_path)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open an existing database with foreign keys enforced
pub fn open(db_path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(db_path.as_ref())?;
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;",
    )?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing only if it succeeds
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
