// src/server/exports.rs

//! Retention of exported archives
//!
//! Each export writes its archive into its own directory under the export
//! scratch directory. The queue remembers when each one may be deleted.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// FIFO of (expiry, archive path)
///
/// Every entry is pushed with the same TTL, so expiries are
/// non-decreasing from front to back.
#[derive(Debug, Default)]
pub struct ExportQueue {
    entries: VecDeque<(DateTime<Utc>, PathBuf)>,
}

impl ExportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `path` for deletion at `expires`
    pub fn push(&mut self, expires: DateTime<Utc>, path: PathBuf) {
        debug!("Export {} expires at {}", path.display(), expires);
        self.entries.push_back((expires, path));
    }

    /// Delete every archive that has expired at `now`, returning how many
    /// were removed from the queue
    pub fn clean_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while self.entries.front().is_some_and(|(expires, _)| *expires <= now) {
            if let Some((_, path)) = self.entries.pop_front() {
                remove_export(&path);
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Cleaned {} expired export(s)", removed);
        }
        removed
    }

    /// Forget every entry and remove the whole scratch directory
    pub fn clean_all(&mut self, export_dir: &Path) {
        info!("Cleaning temporary directory {}", export_dir.display());
        self.entries.clear();
        if let Err(e) = std::fs::remove_dir_all(export_dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove {}: {}", export_dir.display(), e);
        }
    }
}

/// Remove an archive and the per-export directory holding it
fn remove_export(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Failed to remove expired export {}: {}", path.display(), e);
    }
    if let Some(parent) = path.parent() {
        // Only succeeds once the directory is empty
        let _ = std::fs::remove_dir(parent);
    }
}
