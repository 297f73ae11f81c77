use crate::error::StreamError;
use crate::job::StreamJob;
use async_trait::async_trait;

/// Producer side of the queue.
///
/// `enqueue` returns as soon as the job is accepted. It never waits for the
/// job to run, and a processor failure never flows back to the caller.
#[async_trait]
pub trait JobProducer<J: StreamJob>: Send + Sync {
    /// Returns a receipt: the job id (in-memory) or the stream entry id (Redis).
    async fn enqueue(&self, job: J) -> Result<String, StreamError>;
}
