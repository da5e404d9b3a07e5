// src/server/handlers/students.rs
//! Student listing and registration

use crate::db::models::{STUDENT_ID_LEN, Student};
use crate::server::error::{parse_json, ApiError, ApiResult};
use crate::server::SharedState;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::{debug, info};

/// GET /api/students
///
/// Every student, sorted by ID.
pub async fn list(State(state): State<SharedState>) -> Json<Vec<Student>> {
    info!("Student list request");
    let registry = state.registry.read().await;
    let students: Vec<Student> = registry.students.values().cloned().collect();
    debug!("Responded with {} student(s)", students.len());
    Json(students)
}

/// POST /api/students/add
pub async fn add(State(state): State<SharedState>, body: Bytes) -> ApiResult<StatusCode> {
    let student: Student = parse_json(&body)?;
    info!("Student add request: {} {}", student.student_id, student.name);

    if !student.has_valid_id() {
        return Err(ApiError::BadRequest(format!(
            "Bad student ID length, should be {}",
            STUDENT_ID_LEN
        )));
    }

    let mut registry = state.registry.write().await;
    if registry.students.contains_key(&student.student_id) {
        return Err(ApiError::BadRequest(format!(
            "Student '{}' already exists.",
            student.student_id
        )));
    }

    student.insert(&state.db())?;
    registry
        .students
        .insert(student.student_id.clone(), student);
    Ok(StatusCode::OK)
}
