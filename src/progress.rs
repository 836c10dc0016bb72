//! Shared per-target state written by workers.
//!
//! [`ProgressState`] and the partial [`ScanResult`] sit behind one lock. Workers
//! take it only to record an outcome, never across a network call.
use crate::types::{ProgressState, ResultSet, ScanResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct TargetState {
    progress: ProgressState,
    result: ScanResult,
}

/// Handle to one target's progress counter and partial result.
#[derive(Clone, Debug)]
pub struct SharedTarget {
    inner: Arc<Mutex<TargetState>>,
}

impl SharedTarget {
    pub fn new(target: &str, total_ports: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TargetState {
                progress: ProgressState::new(total_ports as u64),
                result: ScanResult::new(target, total_ports),
            })),
        }
    }

    /// Count one processed task, open or not. Returns the new percentage.
    pub async fn record_completion(&self) -> f64 {
        let mut guard = self.inner.lock().await;
        let pct = guard.progress.record_completion();
        debug!(
            target_host = %guard.result.target,
            completed = guard.progress.completed,
            total = guard.progress.total,
            "progress {pct:.2}%"
        );
        pct
    }

    /// Append a successfully connected address.
    pub async fn record_open(&self, address: String, banner: Option<String>) {
        let mut guard = self.inner.lock().await;
        guard.result.push_open(address, banner);
    }

    pub async fn progress(&self) -> ProgressState {
        self.inner.lock().await.progress
    }

    /// Stamp the elapsed time and final percentage and hand out the result.
    /// Call only once every worker has finished.
    pub async fn finalize(&self, elapsed: Duration) -> ScanResult {
        let mut guard = self.inner.lock().await;
        let pct = guard.progress.percent();
        guard.result.elapsed = elapsed;
        guard.result.progress_percent = pct;
        guard.result.clone()
    }
}

/// Process-wide collection of finished target results.
#[derive(Clone, Debug, Default)]
pub struct SharedResultSet {
    inner: Arc<Mutex<ResultSet>>,
}

impl SharedResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, result: ScanResult) {
        self.inner.lock().await.push(result);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy out everything appended so far.
    pub async fn snapshot(&self) -> ResultSet {
        self.inner.lock().await.clone()
    }
}
