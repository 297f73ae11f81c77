use super::JOB_FIELD;
use crate::error::StreamError;
use crate::job::StreamJob;
use crate::metrics::JobMetrics;
use crate::producer::JobProducer;
use crate::registry::StreamDef;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

/// XADDs jobs to a stream. Shared by the API process and the worker's
/// own re-queueing.
#[derive(Clone)]
pub struct RedisStreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    max_length: i64,
    metrics: JobMetrics,
}

impl RedisStreamProducer {
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>) -> Self {
        let stream_name = stream_name.into();
        Self {
            redis,
            metrics: JobMetrics::new(stream_name.clone()),
            stream_name,
            max_length: 100_000,
        }
    }

    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self::new(redis, S::STREAM_NAME).with_max_length(S::MAX_LENGTH)
    }

    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// XADD `stream MAXLEN ~ max_length * field payload`.
    pub(crate) async fn add(
        &self,
        stream: &str,
        field: &str,
        payload: &str,
    ) -> Result<String, StreamError> {
        let mut conn = self.redis.clone();
        let entry_id: String = redis::cmd("XADD")
            .arg(stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg(field)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(entry_id)
    }
}

#[async_trait]
impl<J: StreamJob> JobProducer<J> for RedisStreamProducer {
    async fn enqueue(&self, job: J) -> Result<String, StreamError> {
        let payload = serde_json::to_string(&job)?;
        let entry_id = self.add(&self.stream_name, JOB_FIELD, &payload).await?;

        self.metrics.job_enqueued();
        debug!(
            job_id = %job.job_id(),
            kind = %job.kind(),
            stream = %self.stream_name,
            entry_id = %entry_id,
            "Job enqueued"
        );
        Ok(entry_id)
    }
}
