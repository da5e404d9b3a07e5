// src/server/handlers/assignments.rs
//! Assignment endpoints: listing, creation, submission and export

use super::sanitize_component;
use crate::api::{ExportParams, SubmitParams};
use crate::archive;
use crate::db::{self, models::{Assignment, Submission, Window}};
use crate::server::error::{parse_json, ApiError, ApiResult};
use crate::server::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Content type of export archives
pub const EXPORT_CONTENT_TYPE: &str = "application/x-zstd-compressed-tar";

/// GET /api/assignments
///
/// Every assignment with its submissions, sorted by name.
pub async fn list(State(state): State<SharedState>) -> Json<Vec<Assignment>> {
    let registry = state.registry.read().await;
    let assignments: Vec<Assignment> = registry.assignments.values().cloned().collect();
    debug!("Responded with {} assignment(s)", assignments.len());
    Json(assignments)
}

/// POST /api/assignments/add
pub async fn add(State(state): State<SharedState>, body: Bytes) -> ApiResult<StatusCode> {
    let mut assignment: Assignment = parse_json(&body)?;
    info!(
        "Assignment add request: {} ({} to {})",
        assignment.name, assignment.start_time, assignment.end_time
    );

    if assignment.end_time < assignment.start_time {
        return Err(ApiError::BadRequest(format!(
            "Assignment '{}' ends before it starts.",
            assignment.name
        )));
    }
    assignment.submissions.clear();

    let mut registry = state.registry.write().await;
    registry.verify_assignment_not_exists(&assignment.name)?;

    assignment.insert(&state.db())?;
    registry
        .assignments
        .insert(assignment.name.clone(), assignment);
    Ok(StatusCode::OK)
}

/// POST /api/assignments/submit
///
/// Stores the decoded file under a fresh UUID and replaces any earlier
/// submission by the same student.
pub async fn submit(State(state): State<SharedState>, body: Bytes) -> ApiResult<StatusCode> {
    let params: SubmitParams = parse_json(&body)?;
    info!(
        "Assignment submit request: assignment: {}, name: {}, student_id: {}",
        params.assignment_name, params.student_name, params.student_id
    );

    let now = crate::time::now();
    let mut registry = state.registry.write().await;
    registry.verify_student(&params.student_id, &params.student_name)?;

    match registry.assignment(&params.assignment_name)?.window(now) {
        Window::Open => {}
        Window::NotOpen => {
            return Err(ApiError::BadRequest(format!(
                "Assignment '{}' is not open yet.",
                params.assignment_name
            )));
        }
        Window::Closed => {
            return Err(ApiError::BadRequest(format!(
                "Assignment '{}' is closed.",
                params.assignment_name
            )));
        }
    }

    let filename = sanitize_component(&params.file.filename).ok_or_else(|| {
        ApiError::BadRequest(format!("Bad file name '{}'.", params.file.filename))
    })?;
    let content = STANDARD
        .decode(params.file.content.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Bad file content: {}", e)))?;

    tokio::fs::create_dir_all(&state.config.files_dir).await?;
    let filepath = state.config.files_dir.join(Uuid::new_v4().to_string());
    tokio::fs::write(&filepath, &content).await?;
    debug!("Stored {} byte(s) at {}", content.len(), filepath.display());

    let submission = Submission {
        assignment_name: params.assignment_name.clone(),
        student_id: params.student_id.clone(),
        submission_time: now,
        filepath: filepath.clone(),
        original_filename: filename,
    };

    let persisted = {
        let mut conn = state.db();
        db::transaction(&mut conn, |tx| submission.replace(tx))
    };
    if let Err(e) = persisted {
        let _ = tokio::fs::remove_file(&filepath).await;
        return Err(e.into());
    }

    let previous = registry
        .assignment_mut(&params.assignment_name)?
        .submissions
        .insert(params.student_id.clone(), submission);

    if let Some(previous) = previous {
        info!(
            "Replacing earlier submission of {} for '{}'",
            params.student_id, params.assignment_name
        );
        if let Err(e) = tokio::fs::remove_file(&previous.filepath).await {
            warn!(
                "Failed to remove previous submission {}: {}",
                previous.filepath.display(),
                e
            );
        }
    }

    Ok(StatusCode::OK)
}

/// One file to place in an export archive
struct ExportEntry {
    source: PathBuf,
    student_dir: String,
    filename: String,
}

/// POST /api/assignments/export
///
/// Archive layout: `<assignment>/<student_id><student_name>/<original_filename>`.
pub async fn export(State(state): State<SharedState>, body: Bytes) -> ApiResult<Response> {
    let params: ExportParams = parse_json(&body)?;
    info!("Assignment export request: {}", params.assignment_name);

    let (assignment_dir, entries) = {
        let registry = state.registry.read().await;
        let assignment = registry.assignment(&params.assignment_name)?;

        let assignment_dir = sanitize_component(&assignment.name).ok_or_else(|| {
            ApiError::BadRequest(format!("Bad assignment name '{}'.", assignment.name))
        })?;

        let mut entries = Vec::with_capacity(assignment.submissions.len());
        for submission in assignment.submissions.values() {
            let Some(student) = registry.students.get(&submission.student_id) else {
                warn!(
                    "Submission by unknown student {} skipped",
                    submission.student_id
                );
                continue;
            };
            let student_dir = sanitize_component(&student.archive_dir_name())
                .unwrap_or_else(|| student.student_id.clone());
            let filename = sanitize_component(&submission.original_filename)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            entries.push(ExportEntry {
                source: submission.filepath.clone(),
                student_dir,
                filename,
            });
        }
        (assignment_dir, entries)
    };

    let export_root = state.config.export_dir.join(Uuid::new_v4().to_string());
    let archive_name = format!("{}.tar.zst", Uuid::new_v4());
    let archive_path = export_root.join(&archive_name);

    let build_root = export_root.clone();
    let build_path = archive_path.clone();
    let built = tokio::task::spawn_blocking(move || {
        build_export(&build_root, &assignment_dir, &entries, &build_path)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))
    .and_then(|result| result);
    if let Err(e) = built {
        // Nothing refers to a half-built export, so drop it now
        if let Err(rm) = tokio::fs::remove_dir_all(&export_root).await
            && rm.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                "Failed to remove incomplete export {}: {}",
                export_root.display(),
                rm
            );
        }
        return Err(e);
    }

    let bytes = tokio::fs::read(&archive_path).await?;
    info!(
        "Exported '{}' as {} ({} bytes)",
        params.assignment_name,
        archive_path.display(),
        bytes.len()
    );

    let now = Utc::now();
    let expires = chrono::Duration::from_std(state.config.export_ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    {
        let mut exports = state.exports.lock();
        exports.push(expires, archive_path);
        exports.clean_expired(now);
    }

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", archive_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Stage the submitted files under `export_root` and pack them into
/// `archive_path`; the staging copy is removed afterwards
fn build_export(
    export_root: &std::path::Path,
    assignment_dir: &str,
    entries: &[ExportEntry],
    archive_path: &std::path::Path,
) -> ApiResult<()> {
    let staging = export_root.join(assignment_dir);
    std::fs::create_dir_all(&staging)?;

    for entry in entries {
        let student_dir = staging.join(&entry.student_dir);
        std::fs::create_dir_all(&student_dir)?;
        std::fs::copy(&entry.source, student_dir.join(&entry.filename))?;
    }

    archive::create_tar_zst(archive_path, std::slice::from_ref(&staging))
        .map_err(|e| ApiError::from(crate::Error::from(e)))?;
    std::fs::remove_dir_all(&staging)?;
    Ok(())
}
