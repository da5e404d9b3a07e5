// src/server/mod.rs
//! hc homework collection server
//!
//! This module provides an HTTP server that:
//! - Registers students and assignments
//! - Accepts base64-encoded file submissions inside each assignment's window
//! - Exports all submissions of an assignment as a `.tar.zst` archive
//! - Issues admin tokens
//!
//! Students and assignments are held in memory and written through to
//! SQLite. Exported archives are deleted after a configurable TTL.

mod error;
mod exports;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, BAD_JSON};
pub use exports::ExportQueue;
pub use handlers::assignments::EXPORT_CONTENT_TYPE;
pub use routes::create_router;
pub use state::{Registry, ServerState, SharedState};

use crate::error::{Error, Result};
use crate::paths;
use chrono::Utc;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default request body limit (256 MiB)
pub const DEFAULT_MAX_UPLOAD: usize = 256 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host name or address to bind to
    pub host: String,
    /// Port to bind to (0 picks a free port)
    pub port: u16,
    /// Largest accepted request body in bytes
    pub max_upload: usize,
    /// Root of persistent data
    pub data_dir: PathBuf,
    /// SQLite database
    pub db_path: PathBuf,
    /// Stored submission files
    pub files_dir: PathBuf,
    /// Scratch directory for export archives; removed on stop
    pub export_dir: PathBuf,
    /// How long an export archive is kept after it is served
    pub export_ttl: Duration,
    /// Period of the background export sweep
    pub cleanup_interval: Duration,
    pub admin_username: String,
    pub admin_password: String,
}

impl ServerConfig {
    /// Defaults with every data path derived from `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self {
            host: "localhost".to_string(),
            port: 8080,
            max_upload: DEFAULT_MAX_UPLOAD,
            data_dir: PathBuf::new(),
            db_path: PathBuf::new(),
            files_dir: PathBuf::new(),
            export_dir: paths::default_export_dir(),
            export_ttl: Duration::from_secs(60 * 60),
            cleanup_interval: Duration::from_secs(10 * 60),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        };
        config.set_data_dir(data_dir);
        config
    }

    /// Move the data directory, along with the database and files paths
    pub fn set_data_dir(&mut self, data_dir: impl Into<PathBuf>) {
        self.data_dir = data_dir.into();
        self.db_path = paths::db_path(&self.data_dir);
        self.files_dir = paths::files_dir(&self.data_dir);
    }
}

/// A startable, stoppable hc server
pub struct Server {
    state: SharedState,
    local_addr: Option<SocketAddr>,
    serve_task: Option<JoinHandle<()>>,
    cleanup_task: Option<JoinHandle<()>>,
}

impl Server {
    /// Open the database and load students and assignments
    pub fn new(config: ServerConfig) -> Result<Self> {
        let state = Arc::new(ServerState::open(config)?);
        Ok(Self {
            state,
            local_addr: None,
            serve_task: None,
            cleanup_task: None,
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Bind and start serving in the background
    ///
    /// Returns once the listener is bound, so requests can be sent as soon
    /// as this resolves.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::ServerError("Server is already running".to_string()));
        }
        // Join anything left over from a stop requested over the API
        self.join_tasks().await;

        let config = &self.state.config;
        let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| {
                Error::ServerError(format!(
                    "Failed to bind {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;
        let addr = listener.local_addr()?;

        tracing::info!("Starting hc server on http://{}", addr);
        tracing::info!("Database: {}", config.db_path.display());
        tracing::info!("Files: {}", config.files_dir.display());
        tracing::info!("Exports: {}", config.export_dir.display());

        self.state.mark_started();

        let app = create_router(self.state.clone());
        let state = self.state.clone();
        let mut shutdown = state.subscribe_shutdown();
        self.serve_task = Some(tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.wait_for(|stop| *stop).await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
            tracing::info!("Server stopped");
            state.mark_stopped();
        }));

        let cleanup_state = self.state.clone();
        self.cleanup_task = Some(tokio::spawn(async move {
            run_cleanup_loop(cleanup_state).await;
        }));

        self.local_addr = Some(addr);
        Ok(())
    }

    /// Remove exports, shut down gracefully and wait until done
    pub async fn stop(&mut self) {
        if self.serve_task.is_none() {
            tracing::warn!("Server is not running");
            return;
        }

        tracing::info!("Stopping server");
        self.state.request_shutdown();
        self.join_tasks().await;
        self.local_addr = None;
    }

    async fn join_tasks(&mut self) {
        if let Some(task) = self.serve_task.take()
            && let Err(e) = task.await
        {
            tracing::error!("Server task failed: {}", e);
        }
        if let Some(task) = self.cleanup_task.take()
            && let Err(e) = task.await
        {
            tracing::error!("Cleanup task failed: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        self.serve_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Address actually bound, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Resolve when the server is not running
    ///
    /// Also resolves after a stop requested through `/api/stop`.
    pub async fn wait(&self) {
        let mut stopped = self.state.subscribe_stopped();
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }
}

/// Periodically delete expired export archives until shutdown
async fn run_cleanup_loop(state: SharedState) {
    let interval = state.config.cleanup_interval;
    let mut shutdown = state.subscribe_shutdown();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                state.exports.lock().clean_expired(Utc::now());
            }
            _ = shutdown.wait_for(|stop| *stop) => break,
        }
    }
}
