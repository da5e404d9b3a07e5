// src/db/models/submission.rs

//! Submission model
//!
//! A student has at most one submission per assignment; submitting again
//! replaces the previous row.

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A stored file handed in by a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub assignment_name: String,
    pub student_id: String,
    #[serde(with = "crate::time::iso8601")]
    pub submission_time: DateTime<Utc>,
    /// Where the uploaded bytes live on disk
    pub filepath: PathBuf,
    /// File name as uploaded, used inside export archives
    pub original_filename: String,
}

impl Submission {
    /// Insert this submission, replacing any previous one for the same
    /// (assignment, student) pair
    pub fn replace(&self, conn: &Connection) -> Result<()> {
        Self::delete(conn, &self.assignment_name, &self.student_id)?;
        conn.execute(
            "INSERT INTO submissions
                (assignment_name, student_id, submission_time, filepath, original_filename)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.assignment_name,
                &self.student_id,
                crate::time::format_time(&self.submission_time),
                self.filepath.to_string_lossy(),
                &self.original_filename,
            ],
        )?;
        Ok(())
    }

    /// Delete the submission of a student for an assignment, if any
    pub fn delete(conn: &Connection, assignment_name: &str, student_id: &str) -> Result<usize> {
        let deleted = conn.execute(
            "DELETE FROM submissions WHERE assignment_name = ?1 AND student_id = ?2",
            params![assignment_name, student_id],
        )?;
        Ok(deleted)
    }
}
