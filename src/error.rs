// src/error.rs

//! Error types shared by the library modules

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the hc library
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] crate::archive::ArchiveError),

    #[error("Server error: {0}")]
    ServerError(String),
}
