use crate::error::StreamError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A unit of background work.
///
/// Jobs cross process boundaries as JSON, so they must be plain value
/// snapshots: everything the processor needs is captured when the job is
/// built.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Stable identifier used in logs and as the in-memory receipt.
    fn job_id(&self) -> String;

    /// Routing key for [`ProcessorRegistry`](crate::ProcessorRegistry).
    fn kind(&self) -> &str;

    /// How many times this job has already failed.
    fn retry_count(&self) -> u32;

    /// Copy of the job with the retry counter bumped.
    fn with_retry(&self) -> Self;

    /// Upper bound on retries regardless of error category. The default
    /// matches the largest category budget so the category decides.
    fn max_retries(&self) -> u32 {
        5
    }

    fn exceeded_max_retries(&self) -> bool {
        self.retry_count() >= self.max_retries()
    }
}

/// Handles jobs of one or more kinds.
///
/// ```ignore
/// struct AnswerMailHandler { provider: Arc<dyn EmailProvider>, /* ... */ }
///
/// #[async_trait]
/// impl StreamProcessor<MailJob> for AnswerMailHandler {
///     async fn process(&self, job: &MailJob) -> Result<(), StreamError> { /* ... */ }
///     fn name(&self) -> &'static str { "answer_mail" }
/// }
/// ```
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(true)
    }
}

/// Retry decision shared by both workers.
pub(crate) fn should_retry<J: StreamJob>(job: &J, error: &StreamError) -> bool {
    !job.exceeded_max_retries() && error.should_retry(job.retry_count())
}

/// Runs the processor on its own task so a panic surfaces as a transient
/// error instead of unwinding through the worker loop.
pub(crate) async fn process_isolated<J, P>(processor: &Arc<P>, job: &J) -> Result<(), StreamError>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    let processor = processor.clone();
    let job = job.clone();
    tokio::spawn(async move { processor.process(&job).await })
        .await
        .unwrap_or_else(|e| Err(StreamError::Internal(format!("Processor panicked: {}", e))))
}
