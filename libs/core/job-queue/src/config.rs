use crate::registry::StreamDef;

/// Settings for [`RedisStreamWorker`](crate::RedisStreamWorker).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,
    pub consumer_group: String,
    pub dlq_stream: String,
    /// Unique per process so pending entries can be told apart.
    pub consumer_id: String,
    /// Entries fetched per XREADGROUP.
    pub batch_size: usize,
    /// XREADGROUP BLOCK timeout.
    pub block_timeout_ms: u64,
    /// Approximate MAXLEN applied when re-queueing and dead-lettering.
    pub max_length: i64,
    /// Minimum idle time before another consumer's pending entry is
    /// claimed. Kept above the longest retry backoff so entries waiting on a
    /// scheduled retry are left alone.
    pub claim_timeout_ms: u64,
    /// How often the group's pending list is scanned for abandoned entries.
    pub claim_interval_ms: u64,
}

impl WorkerConfig {
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self {
            stream_name: S::STREAM_NAME.to_string(),
            consumer_group: S::CONSUMER_GROUP.to_string(),
            dlq_stream: S::DLQ_STREAM.to_string(),
            consumer_id: format!("worker-{}", uuid::Uuid::new_v4().simple()),
            batch_size: 10,
            block_timeout_ms: 5_000,
            max_length: S::MAX_LENGTH,
            claim_timeout_ms: 300_000,
            claim_interval_ms: 30_000,
        }
    }

    pub fn with_consumer_id(mut self, consumer_id: impl Into<String>) -> Self {
        self.consumer_id = consumer_id.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_block_timeout_ms(mut self, block_timeout_ms: u64) -> Self {
        self.block_timeout_ms = block_timeout_ms;
        self
    }

    pub fn with_claim_timeout_ms(mut self, claim_timeout_ms: u64) -> Self {
        self.claim_timeout_ms = claim_timeout_ms;
        self
    }

    pub fn with_claim_interval_ms(mut self, claim_interval_ms: u64) -> Self {
        self.claim_interval_ms = claim_interval_ms;
        self
    }
}
