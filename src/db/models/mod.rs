// src/db/models/mod.rs

//! Data models for hc database entities
//!
//! The same structs are used on the wire (serde) and in SQLite.

mod assignment;
mod student;
mod submission;

pub use assignment::{Assignment, Window};
pub use student::{STUDENT_ID_LEN, Student};
pub use submission::Submission;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    #[test]
    fn test_students_round_trip_through_database() {
        let (_temp, conn) = create_test_db();
        Student::new("202326202022", "刘家福").insert(&conn).unwrap();
        Student::new("202326202001", "刘志远").insert(&conn).unwrap();

        let students = Student::load_all(&conn).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students["202326202001"].name, "刘志远");

        // BTreeMap keeps the listing sorted by ID
        let ids: Vec<_> = students.keys().cloned().collect();
        assert_eq!(ids, vec!["202326202001", "202326202022"]);
    }

    #[test]
    fn test_duplicate_student_rejected() {
        let (_temp, conn) = create_test_db();
        Student::new("202326202022", "a").insert(&conn).unwrap();
        assert!(Student::new("202326202022", "b").insert(&conn).is_err());
    }

    #[test]
    fn test_submission_requires_known_student() {
        let (_temp, conn) = create_test_db();
        Assignment::new(
            "hw1",
            crate::time::parse_time("2025-01-01T00:00:00Z").unwrap(),
            crate::time::parse_time("2025-02-01T00:00:00Z").unwrap(),
        )
        .insert(&conn)
        .unwrap();

        let submission = Submission {
            assignment_name: "hw1".to_string(),
            student_id: "000000000000".to_string(),
            submission_time: crate::time::now(),
            filepath: "/nowhere".into(),
            original_filename: "x".to_string(),
        };
        assert!(submission.replace(&conn).is_err());
    }
}
