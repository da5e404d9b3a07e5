// src/server/routes.rs
//! Axum router configuration for the hc server
//!
//! Layers, outermost first:
//! - Request logging (`METHOD PATH -> STATUS`)
//! - CORS, which answers preflight requests itself
//! - Request body limit (`max_upload`), 413 above it

use crate::server::handlers::{self, admin, assignments, students};
use crate::server::SharedState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let max_upload = state.config.max_upload;

    Router::new()
        .route("/hi", get(handlers::hi))
        // Assignments
        .route("/api/assignments", get(assignments::list))
        .route("/api/assignments/add", post(assignments::add))
        .route("/api/assignments/submit", post(assignments::submit))
        .route("/api/assignments/export", post(assignments::export))
        // Students
        .route("/api/students", get(students::list))
        .route("/api/students/add", post(students::add))
        // Admin
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/verify", post(admin::verify))
        .route("/api/stop", post(handlers::stop))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors)
        .layer(middleware::from_fn(log_request))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Log every request with its final status
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();

    tracing::info!("{:4} {:25} -> {}", method.as_str(), path, status);
    if response.status() == StatusCode::NOT_FOUND {
        tracing::error!("Strange access: {} {} -> {}", method, path, status);
    }

    response
}
