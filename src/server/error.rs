// src/server/error.rs

//! Error responses for API handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Body sent for any request whose JSON cannot be decoded
pub const BAD_JSON: &str = "Bad request json format";

/// A failed request, rendered as a `text/plain` response
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request json format")]
    BadJson(#[source] serde_json::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadJson(e) => {
                tracing::error!("{}: {}", BAD_JSON, e);
                (StatusCode::BAD_REQUEST, BAD_JSON).into_response()
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("{} Ignoring request.", msg);
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("Server internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Decode a JSON request body
///
/// Syntax errors, type mismatches and missing fields all map to
/// [`ApiError::BadJson`].
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(ApiError::BadJson)
}
