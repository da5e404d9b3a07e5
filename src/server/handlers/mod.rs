// src/server/handlers/mod.rs
//! HTTP request handlers for the hc server

pub mod admin;
pub mod assignments;
pub mod students;

use crate::server::SharedState;
use axum::{extract::State, http::StatusCode};

/// GET /hi
pub async fn hi() -> &'static str {
    "Hello World!"
}

/// POST /api/stop
///
/// Replies first; the shutdown runs on its own task so the handler is not
/// waiting on the server it belongs to.
pub async fn stop(State(state): State<SharedState>) -> StatusCode {
    tracing::info!("Stop requested over the API");
    tokio::spawn(async move {
        state.request_shutdown();
    });
    StatusCode::OK
}

/// Turn an uploaded or stored name into a single safe path component
///
/// Separators and NUL become `_`. Returns None for names that would
/// still escape or alias a directory (empty, `.` or `..`).
pub fn sanitize_component(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => None,
        _ => Some(cleaned),
    }
}
