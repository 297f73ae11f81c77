//! Prometheus metrics for job queues.

use crate::error::{ErrorCategory, StreamError};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), StreamError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| StreamError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
        info!("Prometheus metrics initialized");
        Ok::<_, StreamError>(handle)
    })?;
    Ok(())
}

/// Prometheus text exposition, empty until [`init_metrics`] ran.
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Counters and timings labelled by queue name.
#[derive(Debug, Clone)]
pub struct JobMetrics {
    queue: String,
}

impl JobMetrics {
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn job_enqueued(&self) {
        counter!("job_queue_jobs_enqueued_total", "queue" => self.queue.clone()).increment(1);
    }

    pub fn job_processed(&self, duration: Duration) {
        counter!(
            "job_queue_jobs_processed_total",
            "queue" => self.queue.clone(),
            "status" => "success"
        )
        .increment(1);

        histogram!("job_queue_job_duration_seconds", "queue" => self.queue.clone())
            .record(duration.as_secs_f64());
    }

    pub fn job_failed(&self, category: ErrorCategory) {
        counter!(
            "job_queue_jobs_processed_total",
            "queue" => self.queue.clone(),
            "status" => "failed"
        )
        .increment(1);

        counter!(
            "job_queue_job_errors_total",
            "queue" => self.queue.clone(),
            "category" => category.as_str()
        )
        .increment(1);
    }

    pub fn job_retried(&self) {
        counter!("job_queue_jobs_retried_total", "queue" => self.queue.clone()).increment(1);
    }

    /// Taken over from another consumer's pending list.
    pub fn jobs_claimed(&self, count: u64) {
        counter!("job_queue_jobs_claimed_total", "queue" => self.queue.clone()).increment(count);
    }

    /// Dropped in memory or moved to the dead-letter stream.
    pub fn job_dead_lettered(&self) {
        counter!("job_queue_jobs_dead_lettered_total", "queue" => self.queue.clone()).increment(1);
    }
}
