// src/bench.rs

//! Load generator for a running server
//!
//! A fixed number of tasks is shared by concurrent workers. Each task
//! requests `/hi` and `/api/assignments` and fails the run if either one
//! does not succeed.

use crate::client::{ClientResult, HcClient};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::debug;

/// Outcome of a benchmark run
#[derive(Debug, Clone, Copy)]
pub struct BenchReport {
    pub threads: usize,
    pub tasks: usize,
    pub elapsed: Duration,
}

impl BenchReport {
    /// Completed tasks per second
    pub fn rate(&self) -> f64 {
        self.tasks as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Threads: {}, Rate: {:.2} tasks/s", self.threads, self.rate())
    }
}

/// Run `tasks` tasks against `client` from `threads` workers
pub async fn run(client: HcClient, threads: usize, tasks: usize) -> ClientResult<BenchReport> {
    let threads = threads.max(1);
    let next = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let mut workers = JoinSet::new();
    for worker in 0..threads {
        let client = client.clone();
        let next = Arc::clone(&next);
        workers.spawn(async move {
            let mut done = 0usize;
            while next.fetch_add(1, Ordering::Relaxed) < tasks {
                client.hi().await?;
                client.assignments().await?;
                done += 1;
            }
            debug!("Worker {} finished {} task(s)", worker, done);
            ClientResult::Ok(())
        });
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(result) => result?,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => debug!("Worker cancelled: {}", e),
        }
    }

    Ok(BenchReport {
        threads,
        tasks,
        elapsed: start.elapsed(),
    })
}
