use crate::config::ScanConfig;
use crate::error::Result;
use crate::probe::{probe, ProbeOutcome};
use crate::progress::SharedTarget;
use crate::types::ScanTask;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

/// Fixed set of workers draining one target's task queue.
pub struct WorkerPool {
    set: JoinSet<()>,
}

impl WorkerPool {
    /// Spawn `config.workers` workers sharing `queue`.
    ///
    /// Each worker pulls a task, probes it, records the outcome in `shared`
    /// and repeats until the queue is closed and empty. `limiter`, when given,
    /// caps in-flight probes across every pool that shares it.
    pub fn spawn(
        queue: mpsc::Receiver<ScanTask>,
        shared: SharedTarget,
        config: Arc<ScanConfig>,
        limiter: Option<Arc<Semaphore>>,
    ) -> Self {
        let queue = Arc::new(Mutex::new(queue));
        let mut set = JoinSet::new();
        for id in 0..config.workers {
            set.spawn(worker(
                id,
                queue.clone(),
                shared.clone(),
                config.clone(),
                limiter.clone(),
            ));
        }
        Self { set }
    }

    /// Wait for every worker to observe queue closure and finish.
    /// All workers are awaited even if one of them failed.
    pub async fn join(mut self) -> Result<()> {
        let mut first_err = None;
        while let Some(res) = self.set.join_next().await {
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<ScanTask>>>,
    shared: SharedTarget,
    config: Arc<ScanConfig>,
    limiter: Option<Arc<Semaphore>>,
) {
    let mut handled = 0usize;
    loop {
        // Lock only for the dequeue; the probe below runs unlocked.
        let next = queue.lock().await.recv().await;
        let Some(task) = next else { break };

        let permit = match &limiter {
            Some(sem) => sem.clone().acquire_owned().await.ok(),
            None => None,
        };
        let outcome = probe(task.as_str(), config.connect_timeout, &config.banner).await;
        drop(permit);

        if let ProbeOutcome::Open { banner } = outcome {
            shared.record_open(task.into_string(), banner).await;
        }
        shared.record_completion().await;
        handled += 1;
    }
    debug!(worker = id, handled, "worker finished");
}
