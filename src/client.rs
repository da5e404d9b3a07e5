// src/client.rs

//! HTTP client for a running hc server
//!
//! One method per route, each returning the decoded result.
//!
//! # Example
//!
//! ```ignore
//! use hc::client::HcClient;
//!
//! let client = HcClient::new("http://localhost:8080")?;
//! assert_eq!(client.hi().await?, "Hello World!");
//! for assignment in client.assignments().await? {
//!     println!("{} closes at {}", assignment.name, assignment.end_time);
//! }
//! ```

use crate::api::{
    AdminLoginParams, AdminLoginResult, AdminVerifyTokenParams, AdminVerifyTokenResult,
    ExportParams, SubmitParams,
};
use crate::db::models::{Assignment, Student};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Client-side errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never completed or the body could not be decoded
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Status code, for errors that came from the server
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Typed client for the hc HTTP API
#[derive(Debug, Clone)]
pub struct HcClient {
    base_url: String,
    http: reqwest::Client,
}

impl HcClient {
    /// Create a client for a server at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> ClientResult<Response> {
        let response = self.http.get(self.url(path)).send().await?;
        check(response).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ClientResult<Response> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        check(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        Ok(self.get(path).await?.json().await?)
    }

    async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<R> {
        Ok(self.post(path, body).await?.json().await?)
    }

    /// GET /hi
    pub async fn hi(&self) -> ClientResult<String> {
        Ok(self.get("/hi").await?.text().await?)
    }

    /// GET /api/assignments
    pub async fn assignments(&self) -> ClientResult<Vec<Assignment>> {
        self.get_json("/api/assignments").await
    }

    /// POST /api/assignments/add
    pub async fn add_assignment(&self, assignment: &Assignment) -> ClientResult<()> {
        self.post("/api/assignments/add", assignment).await?;
        Ok(())
    }

    /// POST /api/assignments/submit
    pub async fn submit(&self, params: &SubmitParams) -> ClientResult<()> {
        self.post("/api/assignments/submit", params).await?;
        Ok(())
    }

    /// POST /api/assignments/export, returning the `.tar.zst` bytes
    pub async fn export(&self, assignment_name: &str) -> ClientResult<Vec<u8>> {
        let params = ExportParams {
            assignment_name: assignment_name.to_string(),
        };
        let bytes = self
            .post("/api/assignments/export", &params)
            .await?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// GET /api/students
    pub async fn students(&self) -> ClientResult<Vec<Student>> {
        self.get_json("/api/students").await
    }

    /// POST /api/students/add
    pub async fn add_student(&self, student: &Student) -> ClientResult<()> {
        self.post("/api/students/add", student).await?;
        Ok(())
    }

    /// POST /api/admin/login, returning the issued token
    pub async fn admin_login(&self, username: &str, password: &str) -> ClientResult<String> {
        let params = AdminLoginParams {
            username: username.to_string(),
            password: password.to_string(),
        };
        let result: AdminLoginResult = self.post_json("/api/admin/login", &params).await?;
        Ok(result.token)
    }

    /// POST /api/admin/verify
    pub async fn verify_token(&self, token: &str) -> ClientResult<bool> {
        let params = AdminVerifyTokenParams {
            token: token.to_string(),
        };
        let result: AdminVerifyTokenResult = self.post_json("/api/admin/verify", &params).await?;
        Ok(result.ok)
    }

    /// POST /api/stop
    pub async fn stop(&self) -> ClientResult<()> {
        let response = self.http.post(self.url("/api/stop")).send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ClientError::Status`]
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}
