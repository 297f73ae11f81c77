use super::{DLQ_FIELD, DeadLetter, JOB_FIELD, RedisStreamProducer};
use crate::config::WorkerConfig;
use crate::error::StreamError;
use crate::job::{StreamJob, StreamProcessor, process_isolated, should_retry};
use crate::metrics::JobMetrics;
use chrono::Utc;
use redis::RedisResult;
use redis::aio::ConnectionManager;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

type StreamEntry = (String, Vec<(String, String)>);
type StreamReply = Option<Vec<(String, Vec<StreamEntry>)>>;
/// XPENDING extended form: id, consumer, idle ms, delivery count.
type PendingEntry = (String, String, u64, u64);

const MAX_BACKOFF_SECS: u64 = 30;

/// Consumer-group worker for one stream.
///
/// On startup it creates the group if needed and replays every entry that
/// was delivered to this consumer but never acknowledged. After that it
/// blocks on new entries until shutdown, and every `claim_interval_ms` it
/// takes over entries other consumers left pending for longer than
/// `claim_timeout_ms` (a crashed process, a consumer id that changed on
/// restart).
pub struct RedisStreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    redis: ConnectionManager,
    processor: Arc<P>,
    producer: RedisStreamProducer,
    config: WorkerConfig,
    metrics: JobMetrics,
    _job: PhantomData<J>,
}

impl<J, P> RedisStreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(redis: ConnectionManager, processor: P, config: WorkerConfig) -> Self {
        let producer = RedisStreamProducer::new(redis.clone(), config.stream_name.clone())
            .with_max_length(config.max_length);
        Self {
            metrics: JobMetrics::new(config.stream_name.clone()),
            redis,
            processor: Arc::new(processor),
            producer,
            config,
            _job: PhantomData,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Redis answers PING and the processor reports healthy.
    pub async fn health_check(&self) -> Result<bool, StreamError> {
        let mut conn = self.redis.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG" && self.processor.health_check().await?)
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            "Starting stream worker"
        );

        self.ensure_consumer_group().await?;
        self.replay_pending().await;
        self.claim_abandoned().await;

        let claim_interval = Duration::from_millis(self.config.claim_interval_ms);
        let mut last_claim = Instant::now();
        let mut consecutive_errors: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            if last_claim.elapsed() >= claim_interval {
                self.claim_abandoned().await;
                last_claim = Instant::now();
            }

            let batch = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                batch = self.read(">", true) => batch,
            };

            match batch {
                Ok(entries) => {
                    if consecutive_errors > 0 {
                        info!(consecutive_errors, "Redis connection recovered");
                        consecutive_errors = 0;
                    }
                    for (entry_id, fields) in entries {
                        self.handle_entry(entry_id, fields).await;
                    }
                }
                Err(StreamError::Redis(e)) if e.to_string().contains("NOGROUP") => {
                    warn!("Consumer group missing, recreating");
                    if let Err(e) = self.ensure_consumer_group().await {
                        error!(error = %e, "Failed to recreate consumer group");
                    }
                }
                Err(e) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    let backoff_secs = 2u64.pow(consecutive_errors.min(5)).min(MAX_BACKOFF_SECS);
                    warn!(
                        error = %e,
                        consecutive_errors,
                        backoff_secs,
                        "Failed to read from stream, backing off"
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                }
            }
        }

        info!("Received shutdown signal, stream worker stopped");
        Ok(())
    }

    async fn ensure_consumer_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();
        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(group = %self.config.consumer_group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    /// Pages through this consumer's pending list from the start. Entries
    /// waiting on a scheduled retry stay pending, so the cursor moves past
    /// each page instead of re-reading from `0`.
    async fn replay_pending(&self) {
        let mut cursor = "0".to_string();
        let mut replayed = 0usize;

        loop {
            let entries = match self.read(&cursor, false).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Failed to read pending entries on startup");
                    break;
                }
            };
            let Some((last_id, _)) = entries.last() else {
                break;
            };
            cursor = last_id.clone();
            replayed += entries.len();

            for (entry_id, fields) in entries {
                self.handle_entry(entry_id, fields).await;
            }
        }

        if replayed > 0 {
            info!(count = replayed, "Replayed pending entries");
        }
    }

    /// XPENDING for entries idle past the claim timeout, then XCLAIM them
    /// onto this consumer and process them.
    async fn claim_abandoned(&self) {
        let mut conn = self.redis.clone();
        let pending: RedisResult<Vec<PendingEntry>> = redis::cmd("XPENDING")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("IDLE")
            .arg(self.config.claim_timeout_ms)
            .arg("-")
            .arg("+")
            .arg(self.config.batch_size)
            .query_async(&mut conn)
            .await;

        let pending = match pending {
            Ok(pending) => pending,
            Err(e) if e.to_string().contains("NOGROUP") => return,
            Err(e) => {
                debug!(error = %e, "Failed to list pending entries");
                return;
            }
        };
        if pending.is_empty() {
            return;
        }

        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg(self.config.claim_timeout_ms);
        for (entry_id, _, _, _) in &pending {
            cmd.arg(entry_id);
        }

        let claimed: Vec<StreamEntry> = match cmd.query_async(&mut conn).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(error = %e, "Failed to claim abandoned entries");
                return;
            }
        };
        if claimed.is_empty() {
            return;
        }

        let previous: Vec<&str> = pending.iter().map(|(_, consumer, _, _)| consumer.as_str()).collect();
        warn!(count = claimed.len(), previous_consumers = ?previous, "Claimed abandoned entries");
        self.metrics.jobs_claimed(claimed.len() as u64);
        for (entry_id, fields) in claimed {
            self.handle_entry(entry_id, fields).await;
        }
    }

    /// XREADGROUP after `id`: `"0"` (or a later id) for this consumer's
    /// pending entries, `">"` for never-delivered ones.
    async fn read(&self, id: &str, block: bool) -> Result<Vec<StreamEntry>, StreamError> {
        let mut conn = self.redis.clone();
        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id);
        if block {
            cmd.arg("BLOCK").arg(self.config.block_timeout_ms);
        }
        cmd.arg("COUNT")
            .arg(self.config.batch_size)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(id);

        let reply: StreamReply = cmd.query_async(&mut conn).await?;
        Ok(reply
            .unwrap_or_default()
            .into_iter()
            .flat_map(|(_stream, entries)| entries)
            .collect())
    }

    async fn handle_entry(&self, entry_id: String, fields: Vec<(String, String)>) {
        let Some(raw) = fields
            .into_iter()
            .find(|(key, _)| key == JOB_FIELD)
            .map(|(_, value)| value)
        else {
            warn!(entry_id = %entry_id, "Entry has no job field, dead-lettering");
            self.dead_letter_raw(&entry_id, String::new(), "Missing job field".to_string())
                .await;
            return;
        };

        let job = match serde_json::from_str::<J>(&raw) {
            Ok(job) => job,
            Err(e) => {
                warn!(entry_id = %entry_id, error = %e, "Unparseable job, dead-lettering");
                self.dead_letter_raw(&entry_id, raw, e.to_string()).await;
                return;
            }
        };

        let started = Instant::now();
        match process_isolated(&self.processor, &job).await {
            Ok(()) => {
                self.metrics.job_processed(started.elapsed());
                debug!(job_id = %job.job_id(), kind = %job.kind(), entry_id = %entry_id, "Job processed");
                self.ack(&entry_id).await;
            }
            Err(err) => {
                self.metrics.job_failed(err.category());
                if should_retry(&job, &err) {
                    self.schedule_retry(entry_id, &job, &err);
                } else {
                    self.dead_letter(&entry_id, &job, &err).await;
                }
            }
        }
    }

    /// Re-queues after the backoff and only then acknowledges the original,
    /// so a crash in between leaves the entry pending until it is replayed
    /// or claimed.
    fn schedule_retry(&self, entry_id: String, job: &J, err: &StreamError) {
        let delay_ms = err.backoff_delay_ms(job.retry_count());
        warn!(
            job_id = %job.job_id(),
            kind = %job.kind(),
            retry_count = job.retry_count(),
            delay_ms,
            error = %err,
            "Job failed, scheduling retry"
        );
        self.metrics.job_retried();

        let payload = match serde_json::to_string(&job.with_retry()) {
            Ok(payload) => payload,
            Err(e) => {
                error!(job_id = %job.job_id(), error = %e, "Failed to serialize retry");
                return;
            }
        };
        let producer = self.producer.clone();
        let redis = self.redis.clone();
        let stream = self.config.stream_name.clone();
        let group = self.config.consumer_group.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            match producer.add(&stream, JOB_FIELD, &payload).await {
                Ok(_) => {
                    if let Err(e) = ack(redis, &stream, &group, &entry_id).await {
                        warn!(entry_id = %entry_id, error = %e, "Failed to acknowledge retried entry");
                    }
                }
                Err(e) => {
                    error!(entry_id = %entry_id, error = %e, "Failed to re-queue job, leaving it pending")
                }
            }
        });
    }

    async fn dead_letter(&self, entry_id: &str, job: &J, err: &StreamError) {
        error!(
            job_id = %job.job_id(),
            kind = %job.kind(),
            retry_count = job.retry_count(),
            category = err.category().as_str(),
            error = %err,
            "Job failed permanently, moving to DLQ"
        );

        let letter = DeadLetter {
            job_id: job.job_id(),
            kind: job.kind().to_string(),
            job: serde_json::to_value(job).unwrap_or(serde_json::Value::Null),
            error: err.to_string(),
            retry_count: job.retry_count(),
            original_stream_id: entry_id.to_string(),
            failed_at: Utc::now(),
        };
        self.write_dead_letter(entry_id, &letter).await;
    }

    async fn dead_letter_raw(&self, entry_id: &str, payload: String, error: String) {
        let letter = DeadLetter {
            job_id: entry_id.to_string(),
            kind: "unknown".to_string(),
            job: serde_json::Value::String(payload),
            error,
            retry_count: 0,
            original_stream_id: entry_id.to_string(),
            failed_at: Utc::now(),
        };
        self.write_dead_letter(entry_id, &letter).await;
    }

    /// Writes to the DLQ and acknowledges. If the DLQ write fails the entry
    /// stays pending rather than being lost.
    async fn write_dead_letter(&self, entry_id: &str, letter: &DeadLetter) {
        let written = match serde_json::to_string(letter) {
            Ok(data) => self.producer.add(&self.config.dlq_stream, DLQ_FIELD, &data).await,
            Err(e) => Err(e.into()),
        };

        match written {
            Ok(dlq_id) => {
                self.metrics.job_dead_lettered();
                info!(entry_id = %entry_id, dlq_id = %dlq_id, dlq = %self.config.dlq_stream, "Moved job to DLQ");
                self.ack(entry_id).await;
            }
            Err(e) => error!(entry_id = %entry_id, error = %e, "Failed to write dead letter"),
        }
    }

    async fn ack(&self, entry_id: &str) {
        if let Err(e) = ack(
            self.redis.clone(),
            &self.config.stream_name,
            &self.config.consumer_group,
            entry_id,
        )
        .await
        {
            warn!(entry_id = %entry_id, error = %e, "Failed to acknowledge entry");
        }
    }
}

async fn ack(
    mut conn: ConnectionManager,
    stream: &str,
    group: &str,
    entry_id: &str,
) -> Result<(), StreamError> {
    let _: i64 = redis::cmd("XACK")
        .arg(stream)
        .arg(group)
        .arg(entry_id)
        .query_async(&mut conn)
        .await?;
    Ok(())
}
