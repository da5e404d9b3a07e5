// src/db/schema.rs

//! Database schema definitions and migrations
//!
//! Migrations are applied in order and recorded in `schema_version`.

use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Migrations in order; entry `i` brings the schema to version `i + 1`
const MIGRATIONS: &[fn(&Connection) -> Result<()>] = &[migrate_v1];

/// Current schema version
pub const SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

/// Highest applied version, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Bring the database up to `SCHEMA_VERSION`
///
/// Each step commits together with its `schema_version` row, so an
/// interrupted upgrade resumes at the step that failed. A database written
/// by a newer hc is refused.
pub fn migrate(conn: &Connection) -> Result<()> {
    let current = get_schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(Error::MigrationError(format!(
            "Database schema version {} is newer than this hc ({})",
            current, SCHEMA_VERSION
        )));
    }
    if current == SCHEMA_VERSION {
        debug!("Schema is at version {}", current);
        return Ok(());
    }

    for (version, step) in (1i32..).zip(MIGRATIONS).skip(current as usize) {
        info!("Migrating schema to version {}", version);
        let tx = conn.unchecked_transaction()?;
        step(&tx)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
    }
    Ok(())
}

/// Initial schema - Version 1
///
/// - students: enrolled students, keyed by their 12-character school ID
/// - assignments: named assignments with a submission window
/// - submissions: at most one stored file per (assignment, student)
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        CREATE TABLE students (
            student_id TEXT PRIMARY KEY CHECK(length(student_id) = 12),
            name TEXT NOT NULL
        );

        CREATE TABLE assignments (
            name TEXT PRIMARY KEY,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL
        );

        CREATE TABLE submissions (
            assignment_name TEXT NOT NULL,
            student_id TEXT NOT NULL,
            submission_time TEXT NOT NULL,
            filepath TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            PRIMARY KEY (assignment_name, student_id),
            FOREIGN KEY (assignment_name) REFERENCES assignments(name) ON DELETE CASCADE,
            FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
        );

        CREATE INDEX idx_submissions_student_id ON submissions(student_id);
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert!(tables.contains(&"students".to_string()));
        assert!(tables.contains(&"assignments".to_string()));
        assert!(tables.contains(&"submissions".to_string()));
    }

    #[test]
    fn test_migrate_twice_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, SCHEMA_VERSION as i64);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION + 1],
        )
        .unwrap();

        let err = migrate(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than this hc"));
    }

    #[test]
    fn test_student_id_length_is_checked() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO students (student_id, name) VALUES ('123', 'short')",
            [],
        );
        assert!(result.is_err());
    }
}
