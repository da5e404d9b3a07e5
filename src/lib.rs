// src/lib.rs

//! hc - homework collection server
//!
//! An HTTP/JSON service where instructors register students and assignments
//! and students hand in files while an assignment is open. All submissions
//! for an assignment can be exported as one `.tar.zst` archive.
//!
//! # Architecture
//!
//! - Memory-first: students and assignments are served from memory
//! - Write-through: every change is persisted to SQLite before it is visible
//! - Files: uploads are stored under the data directory by UUID
//! - Exports: archives are built in a scratch directory and expire after a TTL

pub mod api;
pub mod archive;
pub mod bench;
pub mod client;
pub mod config;
pub mod db;
mod error;
pub mod paths;
pub mod server;
pub mod time;

pub use api::{
    AdminLoginParams, AdminLoginResult, AdminVerifyTokenParams, AdminVerifyTokenResult,
    ExportParams, File, SubmitParams,
};
pub use client::{ClientError, HcClient};
pub use config::HcConfig;
pub use db::models::{Assignment, Student, Submission};
pub use error::{Error, Result};
pub use server::{Server, ServerConfig};
