// src/api.rs

//! Request and response bodies shared by the server and the client
//!
//! Students and assignments travel as their model types
//! ([`crate::db::models`]); everything else is defined here.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// An uploaded file; `content` is standard base64 with padding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub filename: String,
    pub content: String,
}

impl File {
    /// Encode raw bytes for upload
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(bytes),
        }
    }
}

/// POST /api/assignments/submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    pub student_id: String,
    pub student_name: String,
    pub assignment_name: String,
    pub file: File,
}

/// POST /api/assignments/export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportParams {
    pub assignment_name: String,
}

/// POST /api/admin/login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLoginParams {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLoginResult {
    pub token: String,
}

/// POST /api/admin/verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminVerifyTokenParams {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminVerifyTokenResult {
    pub ok: bool,
}
