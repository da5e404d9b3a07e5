// src/db/models/assignment.rs

//! Assignment model

use super::Submission;
use crate::error::Result;
use crate::time::{format_time, parse_time};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A named assignment with its submission window
///
/// Times are UTC. `submissions` maps student ID to that student's
/// submission; it is ignored when an assignment is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    #[serde(with = "crate::time::iso8601")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "crate::time::iso8601")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub submissions: BTreeMap<String, Submission>,
}

/// Where a point in time falls relative to a submission window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    NotOpen,
    Open,
    Closed,
}

/// One row of the assignment/submission left join
type JoinedRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

impl Assignment {
    pub fn new(name: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
            submissions: BTreeMap::new(),
        }
    }

    /// Classify `at` against `[start_time, end_time]`
    pub fn window(&self, at: DateTime<Utc>) -> Window {
        if at < self.start_time {
            Window::NotOpen
        } else if at > self.end_time {
            Window::Closed
        } else {
            Window::Open
        }
    }

    /// Insert the assignment row (submissions are stored separately)
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO assignments (name, start_time, end_time) VALUES (?1, ?2, ?3)",
            params![
                &self.name,
                format_time(&self.start_time),
                format_time(&self.end_time),
            ],
        )?;
        Ok(())
    }

    /// Load every assignment with its submissions, keyed by name
    ///
    /// Uses a single left join instead of one query per assignment.
    pub fn load_all(conn: &Connection) -> Result<BTreeMap<String, Self>> {
        let mut stmt = conn.prepare(
            "SELECT a.name, a.start_time, a.end_time,
                    s.student_id, s.submission_time, s.filepath, s.original_filename
             FROM assignments a
             LEFT OUTER JOIN submissions s ON a.name = s.assignment_name",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<JoinedRow>, _>>()?;

        let mut assignments = BTreeMap::new();
        for (name, start, end, student_id, submitted, filepath, original) in rows {
            if !assignments.contains_key(&name) {
                let assignment = Self::new(name.clone(), parse_time(&start)?, parse_time(&end)?);
                assignments.insert(name.clone(), assignment);
            }

            if let (Some(student_id), Some(submitted), Some(filepath), Some(original)) =
                (student_id, submitted, filepath, original)
                && let Some(assignment) = assignments.get_mut(&name)
            {
                let submission = Submission {
                    assignment_name: name.clone(),
                    student_id: student_id.clone(),
                    submission_time: parse_time(&submitted)?,
                    filepath: PathBuf::from(filepath),
                    original_filename: original,
                };
                assignment.submissions.insert(student_id, submission);
            }
        }

        Ok(assignments)
    }
}
