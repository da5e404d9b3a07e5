// src/server/handlers/admin.rs
//! Admin login and token verification
//!
//! Tokens are random UUIDs kept in memory; they do not survive a restart.

use crate::api::{AdminLoginParams, AdminLoginResult, AdminVerifyTokenParams, AdminVerifyTokenResult};
use crate::server::error::{parse_json, ApiError, ApiResult};
use crate::server::SharedState;
use axum::{body::Bytes, extract::State, Json};
use tracing::info;

/// POST /api/admin/login
pub async fn login(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<AdminLoginResult>> {
    let params: AdminLoginParams = parse_json(&body)?;
    info!("Admin login: {}", params.username);

    if params.username != state.config.admin_username
        || params.password != state.config.admin_password
    {
        return Err(ApiError::BadRequest("Bad admin credentials.".to_string()));
    }

    let token = state.issue_token();
    info!("Issued admin token for {}", params.username);
    Ok(Json(AdminLoginResult { token }))
}

/// POST /api/admin/verify
pub async fn verify(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<AdminVerifyTokenResult>> {
    let params: AdminVerifyTokenParams = parse_json(&body)?;
    Ok(Json(AdminVerifyTokenResult {
        ok: state.verify_token(&params.token),
    }))
}
