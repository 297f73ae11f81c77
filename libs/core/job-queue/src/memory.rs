//! In-process queue backed by an unbounded tokio channel.

use crate::error::StreamError;
use crate::job::{StreamJob, StreamProcessor, process_isolated, should_retry};
use crate::metrics::JobMetrics;
use crate::producer::JobProducer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Producer half. Cheap to clone; every clone feeds the same worker.
pub struct InMemoryQueue<J: StreamJob> {
    tx: mpsc::UnboundedSender<J>,
    metrics: JobMetrics,
}

impl<J: StreamJob> Clone for InMemoryQueue<J> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<J: StreamJob> InMemoryQueue<J> {
    /// Creates a connected producer/receiver pair.
    pub fn channel(name: impl Into<String>) -> (Self, InMemoryReceiver<J>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let metrics = JobMetrics::new(name);
        let queue = Self {
            tx: tx.clone(),
            metrics: metrics.clone(),
        };
        (queue, InMemoryReceiver { rx, tx, metrics })
    }
}

#[async_trait]
impl<J: StreamJob> JobProducer<J> for InMemoryQueue<J> {
    async fn enqueue(&self, job: J) -> Result<String, StreamError> {
        let job_id = job.job_id();
        self.tx.send(job).map_err(|_| StreamError::QueueClosed)?;
        self.metrics.job_enqueued();
        debug!(job_id = %job_id, queue = %self.metrics.queue(), "Job enqueued");
        Ok(job_id)
    }
}

/// Consumer half. Keeps a sender of its own so retries can re-enter the
/// channel after their backoff.
pub struct InMemoryReceiver<J: StreamJob> {
    rx: mpsc::UnboundedReceiver<J>,
    tx: mpsc::UnboundedSender<J>,
    metrics: JobMetrics,
}

impl<J: StreamJob> InMemoryReceiver<J> {
    /// Takes the next queued job without processing it.
    pub fn try_recv(&mut self) -> Option<J> {
        self.rx.try_recv().ok()
    }

    pub fn into_worker<P>(self, processor: P) -> InMemoryWorker<J, P>
    where
        P: StreamProcessor<J> + 'static,
    {
        InMemoryWorker {
            receiver: self,
            processor: Arc::new(processor),
        }
    }
}

/// Drains the channel one job at a time until shutdown.
pub struct InMemoryWorker<J: StreamJob, P: StreamProcessor<J>> {
    receiver: InMemoryReceiver<J>,
    processor: Arc<P>,
}

impl<J, P> InMemoryWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            queue = %self.receiver.metrics.queue(),
            processor = %self.processor.name(),
            "Starting in-memory worker"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Received shutdown signal, stopping worker");
                        break;
                    }
                }
                job = self.receiver.rx.recv() => match job {
                    Some(job) => self.handle(job).await,
                    None => break,
                },
            }
        }

        info!("In-memory worker stopped");
    }

    async fn handle(&self, job: J) {
        let metrics = &self.receiver.metrics;
        let started = Instant::now();

        match process_isolated(&self.processor, &job).await {
            Ok(()) => {
                metrics.job_processed(started.elapsed());
                debug!(job_id = %job.job_id(), kind = %job.kind(), "Job processed");
            }
            Err(err) => {
                metrics.job_failed(err.category());

                if should_retry(&job, &err) {
                    let delay_ms = err.backoff_delay_ms(job.retry_count());
                    warn!(
                        job_id = %job.job_id(),
                        kind = %job.kind(),
                        retry_count = job.retry_count(),
                        delay_ms,
                        error = %err,
                        "Job failed, scheduling retry"
                    );
                    metrics.job_retried();

                    let tx = self.receiver.tx.clone();
                    let retry = job.with_retry();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        let _ = tx.send(retry);
                    });
                } else {
                    error!(
                        job_id = %job.job_id(),
                        kind = %job.kind(),
                        retry_count = job.retry_count(),
                        category = err.category().as_str(),
                        error = %err,
                        "Job failed permanently, dropping"
                    );
                    metrics.job_dead_lettered();
                }
            }
        }
    }
}
