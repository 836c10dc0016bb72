use crate::addr::generate_tasks;
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::pool::WorkerPool;
use crate::progress::{SharedResultSet, SharedTarget};
use crate::types::{ResultSet, ScanResult};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

/// Lifecycle of one target scan. There is no cancelled state: a scan runs
/// until every task has been probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Created,
    Dispatching,
    Draining,
    Complete,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanPhase::Created => "created",
            ScanPhase::Dispatching => "dispatching",
            ScanPhase::Draining => "draining",
            ScanPhase::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Scan one target with its own queue and worker pool.
pub async fn scan_target(target: &str, ports: &[u16], config: &ScanConfig) -> Result<ScanResult> {
    config.validate()?;
    let limiter = global_limiter(config);
    scan_target_internal(target, ports, Arc::new(config.clone()), limiter).await
}

/// Scan every target concurrently, one independent pool per target.
///
/// The returned set is in completion order. Unless `max_in_flight` is set,
/// nothing bounds the total number of simultaneous connects.
pub async fn scan_targets(
    targets: &[String],
    ports: &[u16],
    config: &ScanConfig,
) -> Result<ResultSet> {
    let results = SharedResultSet::new();
    scan_targets_with_shared(targets, ports, config, results.clone()).await?;
    Ok(results.snapshot().await)
}

/// Like [`scan_targets`], appending into a caller-owned result set so it can
/// be observed while other targets are still running.
pub async fn scan_targets_with_shared(
    targets: &[String],
    ports: &[u16],
    config: &ScanConfig,
    results: SharedResultSet,
) -> Result<()> {
    config.validate()?;
    let config = Arc::new(config.clone());
    let limiter = global_limiter(&config);
    let ports: Arc<[u16]> = Arc::from(ports);

    if config.max_in_flight.is_none() {
        info!(
            targets = targets.len(),
            workers = config.workers,
            max_connects = targets.len() * config.workers,
            "no global connection ceiling"
        );
    }

    let mut set = JoinSet::new();
    for target in targets {
        let target = target.clone();
        let ports = ports.clone();
        let config = config.clone();
        let limiter = limiter.clone();
        let results = results.clone();
        set.spawn(async move {
            let res = scan_target_internal(&target, &ports, config, limiter).await?;
            results.push(res).await;
            Ok::<(), ScanError>(())
        });
    }

    let mut first_err = None;
    while let Some(joined) = set.join_next().await {
        let outcome = joined.map_err(ScanError::from).and_then(|r| r);
        if let Err(e) = outcome {
            warn!(error = %e, "target scan failed");
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn global_limiter(config: &ScanConfig) -> Option<Arc<Semaphore>> {
    config.max_in_flight.map(|n| Arc::new(Semaphore::new(n)))
}

async fn scan_target_internal(
    target: &str,
    ports: &[u16],
    config: Arc<ScanConfig>,
    limiter: Option<Arc<Semaphore>>,
) -> Result<ScanResult> {
    let start = Instant::now();
    let shared = SharedTarget::new(target, ports.len());
    log_phase(target, ScanPhase::Created);

    let (tx, rx) = mpsc::channel(config.workers);
    let pool = WorkerPool::spawn(rx, shared.clone(), config, limiter);

    log_phase(target, ScanPhase::Dispatching);
    for task in generate_tasks(target, ports) {
        // Fails only if every worker is gone; the join below reports why.
        if tx.send(task).await.is_err() {
            break;
        }
    }
    drop(tx);

    log_phase(target, ScanPhase::Draining);
    pool.join().await?;

    let result = shared.finalize(start.elapsed()).await;
    log_phase(target, ScanPhase::Complete);
    info!(
        target_host = %target,
        open = result.port_count,
        total = result.total_ports,
        elapsed = %result.time_taken(),
        "target scan finished"
    );
    Ok(result)
}

fn log_phase(target: &str, phase: ScanPhase) {
    info!(target_host = %target, %phase, "scan phase");
}
