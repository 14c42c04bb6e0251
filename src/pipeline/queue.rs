use super::{Pipeline, RunOptions};
use crate::config::Config;
use crate::error::QueueError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// One queued pipeline execution.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Request that enqueued the job, when it came through the gateway.
    pub request_id: Option<String>,
    pub enqueued_at: DateTime<Utc>,
}

/// Producer side of the run-now queue.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
    depth: Arc<AtomicUsize>,
}

pub struct JobReceiver {
    rx: mpsc::Receiver<Job>,
    depth: Arc<AtomicUsize>,
}

pub fn job_queue(capacity: usize) -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let depth = Arc::new(AtomicUsize::new(0));
    (
        JobQueue {
            tx,
            depth: Arc::clone(&depth),
        },
        JobReceiver { rx, depth },
    )
}

impl JobQueue {
    /// Queue a job without waiting. Returns the new job id.
    pub fn enqueue(&self, request_id: Option<String>) -> Result<String, QueueError> {
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            request_id,
            enqueued_at: Utc::now(),
        };
        let job_id = job.id.clone();

        self.depth.fetch_add(1, Ordering::SeqCst);
        match self.tx.try_send(job) {
            Ok(()) => {
                tracing::info!(job_id = %job_id, depth = self.size(), "job queued");
                Ok(job_id)
            }
            Err(err) => {
                self.depth.fetch_sub(1, Ordering::SeqCst);
                match err {
                    mpsc::error::TrySendError::Full(_) => Err(QueueError::Full { job_id }),
                    mpsc::error::TrySendError::Closed(_) => Err(QueueError::Closed),
                }
            }
        }
    }

    /// Jobs waiting for the worker, excluding the one in progress.
    pub fn size(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

impl JobReceiver {
    pub async fn recv(&mut self) -> Option<Job> {
        let job = self.rx.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub max_cycles: u32,
    pub backoff: Duration,
    pub notify_failures: bool,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_cycles: config.generation.max_total_failure_cycles,
            backoff: config.generation.retry_backoff(),
            notify_failures: config.telegram.notify_failures,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_cycles: 2,
            backoff: Duration::from_secs(300),
            notify_failures: false,
        }
    }
}

/// Consume jobs one at a time until `cancel` fires or every producer is gone.
pub async fn run_worker(
    pipeline: Arc<Pipeline>,
    mut jobs: JobReceiver,
    settings: WorkerSettings,
    cancel: CancellationToken,
) {
    tracing::info!(max_cycles = settings.max_cycles, "job worker started");
    loop {
        let job = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };
        process_job(&pipeline, &job, settings, &cancel).await;
    }
    tracing::info!("job worker stopped");
}

async fn process_job(
    pipeline: &Pipeline,
    job: &Job,
    settings: WorkerSettings,
    cancel: &CancellationToken,
) {
    let max_cycles = settings.max_cycles.max(1);
    let mut last_error = String::new();

    for run_number in 1..=max_cycles {
        let span = tracing::info_span!(
            "job",
            job_id = %job.id,
            request_id = job.request_id.as_deref().unwrap_or(""),
            run_number
        );
        let result = pipeline.run(&RunOptions::default()).instrument(span.clone()).await;

        match result {
            Ok(outcome) => {
                span.in_scope(|| {
                    tracing::info!(
                        images = outcome.images.len(),
                        chunks = outcome.delivery.as_ref().map_or(0, |r| r.chunk_count),
                        "job completed"
                    );
                });
                return;
            }
            Err(err) => {
                last_error = err.to_string();
                span.in_scope(|| tracing::warn!(error = %err, "job run failed"));
            }
        }

        if run_number < max_cycles {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!(job_id = %job.id, "shutdown requested during backoff");
                    return;
                }
                () = tokio::time::sleep(settings.backoff) => {}
            }
        }
    }

    tracing::error!(
        job_id = %job.id,
        cycles = max_cycles,
        error = %last_error,
        "job failed after all cycles"
    );

    if settings.notify_failures
        && let Some(delivery) = pipeline.delivery()
    {
        let reference = job.request_id.as_deref().unwrap_or(&job.id);
        if let Err(err) = delivery.send_error_message(Some(reference), &last_error).await {
            tracing::warn!(job_id = %job.id, error = %err, "failure notification not delivered");
        }
    }
}
