// src/db/models/student.rs

//! Student model

use crate::error::Result;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of a school-issued student ID
pub const STUDENT_ID_LEN: usize = 12;

/// An enrolled student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// School ID, exactly [`STUDENT_ID_LEN`] characters
    pub student_id: String,
    pub name: String,
}

impl Student {
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
        }
    }

    /// Whether the student ID has the required length
    pub fn has_valid_id(&self) -> bool {
        self.student_id.chars().count() == STUDENT_ID_LEN
    }

    /// Name of this student's directory inside an export archive
    pub fn archive_dir_name(&self) -> String {
        format!("{}{}", self.student_id, self.name)
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO students (student_id, name) VALUES (?1, ?2)",
            params![&self.student_id, &self.name],
        )?;
        Ok(())
    }

    /// Load every student, keyed by student ID
    pub fn load_all(conn: &Connection) -> Result<BTreeMap<String, Self>> {
        let mut stmt = conn.prepare("SELECT student_id, name FROM students")?;
        let students = stmt
            .query_map([], Self::from_row)?
            .map(|row| row.map(|s| (s.student_id.clone(), s)))
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
        Ok(students)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            student_id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_json() {
        let s: Student =
            serde_json::from_str(r#"{"name":"刘志远","student_id":"202326202001"}"#).unwrap();
        assert_eq!(s.student_id, "202326202001");
        assert_eq!(s.name, "刘志远");
        assert!(s.has_valid_id());
    }

    #[test]
    fn test_student_id_length() {
        assert!(!Student::new("2023262020", "short").has_valid_id());
        assert!(!Student::new("2023262020221", "long").has_valid_id());
        assert!(Student::new("202326202022", "ok").has_valid_id());
    }

    #[test]
    fn test_archive_dir_name() {
        assert_eq!(
            Student::new("202326202022", "刘家福").archive_dir_name(),
            "202326202022刘家福"
        );
    }
}
