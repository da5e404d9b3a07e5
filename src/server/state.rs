// src/server/state.rs

//! Shared server state
//!
//! Students and assignments live in a [`Registry`] behind an async
//! read/write lock. Handlers that mutate it hold the write lock across
//! both the in-memory update and the database write, so the two never
//! disagree.

use super::error::{ApiError, ApiResult};
use super::exports::ExportQueue;
use super::ServerConfig;
use crate::db::{self, models::{Assignment, Student}};
use crate::error::Result;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

/// Shared server state type
pub type SharedState = Arc<ServerState>;

/// In-memory copy of everything stored in the database
#[derive(Debug, Default)]
pub struct Registry {
    /// Keyed by student ID
    pub students: BTreeMap<String, Student>,
    /// Keyed by assignment name
    pub assignments: BTreeMap<String, Assignment>,
}

impl Registry {
    /// Look up a student whose ID and name both match
    pub fn verify_student(&self, student_id: &str, name: &str) -> ApiResult<&Student> {
        match self.students.get(student_id) {
            Some(student) if student.name == name => Ok(student),
            _ => Err(ApiError::BadRequest(format!(
                "Student {} {} doesn't exist.",
                student_id, name
            ))),
        }
    }

    /// Look up an existing assignment
    pub fn assignment(&self, name: &str) -> ApiResult<&Assignment> {
        self.assignments.get(name).ok_or_else(|| missing_assignment(name))
    }

    pub fn assignment_mut(&mut self, name: &str) -> ApiResult<&mut Assignment> {
        self.assignments
            .get_mut(name)
            .ok_or_else(|| missing_assignment(name))
    }

    /// Fail if an assignment with this name already exists
    pub fn verify_assignment_not_exists(&self, name: &str) -> ApiResult<()> {
        if self.assignments.contains_key(name) {
            return Err(ApiError::BadRequest(format!(
                "Assignment '{}' already exists.",
                name
            )));
        }
        Ok(())
    }
}

fn missing_assignment(name: &str) -> ApiError {
    ApiError::BadRequest(format!("Assignment '{}' doesn't exist.", name))
}

/// State shared by every handler
pub struct ServerState {
    pub config: ServerConfig,
    pub registry: RwLock<Registry>,
    pub exports: Mutex<ExportQueue>,
    db: Mutex<Connection>,
    tokens: parking_lot::RwLock<HashSet<String>>,
    /// Set to true to begin a graceful shutdown
    shutdown: watch::Sender<bool>,
    /// True whenever no HTTP server task is running
    stopped: watch::Sender<bool>,
}

impl ServerState {
    /// Open (creating if needed) the database and load its contents
    pub fn open(config: ServerConfig) -> Result<Self> {
        db::init(&config.db_path)?;
        let conn = db::open(&config.db_path)?;

        let students = Student::load_all(&conn)?;
        let assignments = Assignment::load_all(&conn)?;

        for student in students.values() {
            debug!("student=> id: {}, name: {}", student.student_id, student.name);
        }
        for assignment in assignments.values() {
            debug!(
                "assignment=> name: {}, start_time: {}, end_time: {}, submissions: {}",
                assignment.name,
                assignment.start_time,
                assignment.end_time,
                assignment.submissions.len()
            );
        }
        info!(
            "Loaded {} student(s) and {} assignment(s) from {}",
            students.len(),
            assignments.len(),
            config.db_path.display()
        );

        std::fs::create_dir_all(&config.files_dir)?;

        Ok(Self {
            config,
            registry: RwLock::new(Registry {
                students,
                assignments,
            }),
            exports: Mutex::new(ExportQueue::new()),
            db: Mutex::new(conn),
            tokens: parking_lot::RwLock::new(HashSet::new()),
            shutdown: watch::Sender::new(false),
            stopped: watch::Sender::new(true),
        })
    }

    /// Exclusive access to the database connection
    pub fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock()
    }

    /// Create and remember a new admin token
    pub fn issue_token(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().insert(token.clone());
        token
    }

    pub fn verify_token(&self, token: &str) -> bool {
        self.tokens.read().contains(token)
    }

    /// Remove all exports and tell the HTTP server to shut down
    pub fn request_shutdown(&self) {
        self.exports.lock().clean_all(&self.config.export_dir);
        self.shutdown.send_replace(true);
    }

    pub(crate) fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub(crate) fn subscribe_stopped(&self) -> watch::Receiver<bool> {
        self.stopped.subscribe()
    }

    /// Prepare for a fresh HTTP server task
    pub(crate) fn mark_started(&self) {
        self.shutdown.send_replace(false);
        self.stopped.send_replace(false);
    }

    pub(crate) fn mark_stopped(&self) {
        self.stopped.send_replace(true);
    }
}
