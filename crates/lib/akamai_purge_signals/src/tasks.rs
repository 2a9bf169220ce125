use crate::{Config, metrics::PurgeQueueMetrics};
use akamai_purge_ccu::{Ccu, CcuBehaviour as _};
use akamai_purge_opentelemetry::AnyMeterProvider;
use std::{
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument as _, error, info, info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "purge-task-{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("the purge queue was shut down")]
    Closed,
}

/// Fire-and-forget submission of purge work.
pub trait PurgeTaskQueue: Send + Sync {
    fn delay(&self, urls: Vec<String>) -> Result<TaskId, QueueError>;
}

#[derive(Debug)]
struct PurgeJob {
    id: TaskId,
    urls: Vec<String>,
}

/// In-process purge queue.
///
/// One worker task on the tokio runtime handles the jobs one after another.
/// Failed jobs are retried after `retry_delay`, up to `max_retries` times.
pub struct BackgroundPurgeQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<PurgeJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    metrics: Arc<PurgeQueueMetrics>,
}

impl fmt::Debug for BackgroundPurgeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundPurgeQueue")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl BackgroundPurgeQueue {
    /// Start the worker on the current tokio runtime.
    pub fn start(ccu: Arc<Ccu>, config: Config, meter_provider: &AnyMeterProvider) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let metrics = Arc::new(PurgeQueueMetrics::new(meter_provider));

        let worker = tokio::spawn(run_worker(ccu, config, receiver, metrics.clone()));

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            next_id: AtomicU64::new(1),
            metrics,
        }
    }

    /// Stop accepting jobs, and wait until the queued ones are done.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        drop(lock(&self.sender).take());

        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            worker.await?;
        }
        Ok(())
    }
}

impl PurgeTaskQueue for BackgroundPurgeQueue {
    fn delay(&self, urls: Vec<String>) -> Result<TaskId, QueueError> {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));

        lock(&self.sender)
            .as_ref()
            .ok_or(QueueError::Closed)?
            .send(PurgeJob { id, urls })
            .map_err(|_| QueueError::Closed)?;

        self.metrics.queued_tasks.add(1, &[]);
        Ok(id)
    }
}

/// a poisoned lock only means another thread panicked while sending,
/// the `Option` inside is still valid.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_worker(
    ccu: Arc<Ccu>,
    config: Config,
    mut receiver: mpsc::UnboundedReceiver<PurgeJob>,
    metrics: Arc<PurgeQueueMetrics>,
) {
    while let Some(job) = receiver.recv().await {
        let span = info_span!("purge_task", task_id = %job.id, urls = job.urls.len());
        run_job(&ccu, &config, &metrics, job).instrument(span).await;
    }
    info!("purge queue closed, worker stopped");
}

async fn run_job(ccu: &Ccu, config: &Config, metrics: &PurgeQueueMetrics, job: PurgeJob) {
    let mut urls = job.urls;
    let mut attempt = 0;
    loop {
        match ccu.purge_urls(urls.clone()).await {
            Ok(outcomes) => {
                let purged: usize = outcomes.iter().map(|o| o.chunk.len()).sum();
                metrics.completed_tasks.add(1, &[]);
                info!(purged, requests = outcomes.len(), attempt, "purge task finished");
                return;
            }
            Err(err) if err.is_configuration_error() => {
                // retrying won't fix missing credentials.
                metrics.failed_tasks.add(1, &[]);
                error!(?err, "purge task failed, not retrying");
                return;
            }
            Err(err) if attempt < config.max_retries => {
                attempt += 1;
                metrics.retried_attempts.add(1, &[]);
                warn!(
                    ?err,
                    attempt,
                    still_pending = err.pending.len(),
                    retry_in = ?config.retry_delay,
                    "purge task failed, will retry"
                );
                // accepted chunks are not sent again.
                urls = err.pending;
                tokio::time::sleep(config.retry_delay).await;
            }
            Err(err) => {
                metrics.failed_tasks.add(1, &[]);
                error!(?err, attempt, "purge task failed, giving up");
                return;
            }
        }
    }
}
