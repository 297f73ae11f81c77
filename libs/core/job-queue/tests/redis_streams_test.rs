//! Redis Streams round trip against a real Redis. Needs Docker.

use async_trait::async_trait;
use job_queue::{
    DeadLetter, JobProducer, RedisStreamProducer, RedisStreamWorker, StreamDef, StreamError,
    StreamJob, StreamProcessor, WorkerConfig,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::TestRedis;
use tokio::sync::watch;

struct TestStream;

impl StreamDef for TestStream {
    const STREAM_NAME: &'static str = "test:jobs";
    const CONSUMER_GROUP: &'static str = "test_workers";
    const DLQ_STREAM: &'static str = "test:dlq";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Ping {
    id: String,
    kind: String,
    #[serde(default)]
    retry_count: u32,
}

impl Ping {
    fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            retry_count: 0,
        }
    }
}

impl StreamJob for Ping {
    fn job_id(&self) -> String {
        self.id.clone()
    }
    fn kind(&self) -> &str {
        &self.kind
    }
    fn retry_count(&self) -> u32 {
        self.retry_count
    }
    fn with_retry(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl StreamProcessor<Ping> for Recorder {
    async fn process(&self, job: &Ping) -> Result<(), StreamError> {
        if job.kind == "Broken" {
            return Err(StreamError::permanent("bad address"));
        }
        self.seen.lock().unwrap().push(job.id.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

async fn dlq_entries(redis: &TestRedis) -> Vec<DeadLetter> {
    let mut conn = redis.connection();
    let reply: Vec<(String, Vec<(String, String)>)> = redis::cmd("XRANGE")
        .arg(TestStream::DLQ_STREAM)
        .arg("-")
        .arg("+")
        .query_async(&mut conn)
        .await
        .unwrap();
    reply
        .into_iter()
        .map(|(_, fields)| serde_json::from_str(&fields[0].1).unwrap())
        .collect()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_jobs_are_processed_and_failures_dead_lettered() {
    let redis = TestRedis::new().await;
    let producer = RedisStreamProducer::from_stream_def::<TestStream>(redis.connection());

    producer.enqueue(Ping::new("a", "Ping")).await.unwrap();
    producer.enqueue(Ping::new("b", "Broken")).await.unwrap();
    producer.enqueue(Ping::new("c", "Ping")).await.unwrap();

    let recorder = Recorder::default();
    let seen = recorder.seen.clone();
    let config = WorkerConfig::from_stream_def::<TestStream>().with_block_timeout_ms(100);
    let worker = RedisStreamWorker::new(redis.connection(), recorder, config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    for _ in 0..50 {
        let processed = seen.lock().unwrap().len() == 2;
        if processed && dlq_entries(&redis).await.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "c".to_string()]);

    let letters = dlq_entries(&redis).await;
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].job_id, "b");
    assert_eq!(letters[0].kind, "Broken");
    assert!(letters[0].error.contains("bad address"));
}

/// Creates the group and pulls `count` entries as `consumer` without acking,
/// like a process that died mid-batch.
async fn deliver_without_ack(redis: &TestRedis, consumer: &str, count: usize) {
    let mut conn = redis.connection();
    let _: () = redis::cmd("XGROUP")
        .arg("CREATE")
        .arg(TestStream::STREAM_NAME)
        .arg(TestStream::CONSUMER_GROUP)
        .arg("0")
        .arg("MKSTREAM")
        .query_async(&mut conn)
        .await
        .unwrap();
    let _: redis::Value = redis::cmd("XREADGROUP")
        .arg("GROUP")
        .arg(TestStream::CONSUMER_GROUP)
        .arg(consumer)
        .arg("COUNT")
        .arg(count)
        .arg("STREAMS")
        .arg(TestStream::STREAM_NAME)
        .arg(">")
        .query_async(&mut conn)
        .await
        .unwrap();
}

async fn pending_count(redis: &TestRedis) -> u64 {
    let mut conn = redis.connection();
    let summary: (u64, Option<String>, Option<String>, redis::Value) = redis::cmd("XPENDING")
        .arg(TestStream::STREAM_NAME)
        .arg(TestStream::CONSUMER_GROUP)
        .query_async(&mut conn)
        .await
        .unwrap();
    summary.0
}

/// Runs the worker until `expected` jobs were recorded or five seconds pass.
async fn run_until_seen(redis: &TestRedis, config: WorkerConfig, expected: usize) -> Vec<String> {
    let recorder = Recorder::default();
    let seen = recorder.seen.clone();
    let worker = RedisStreamWorker::new(redis.connection(), recorder, config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    for _ in 0..50 {
        if seen.lock().unwrap().len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let seen = seen.lock().unwrap().clone();
    seen
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_entries_left_by_a_dead_consumer_are_claimed() {
    let redis = TestRedis::new().await;
    let producer = RedisStreamProducer::from_stream_def::<TestStream>(redis.connection());
    producer.enqueue(Ping::new("orphan", "Ping")).await.unwrap();

    deliver_without_ack(&redis, "worker-crashed", 10).await;
    assert_eq!(pending_count(&redis).await, 1);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let config = WorkerConfig::from_stream_def::<TestStream>()
        .with_consumer_id("worker-fresh")
        .with_block_timeout_ms(100)
        .with_claim_timeout_ms(100)
        .with_claim_interval_ms(100);
    let seen = run_until_seen(&redis, config, 1).await;

    assert_eq!(seen, vec!["orphan".to_string()]);
    assert_eq!(pending_count(&redis).await, 0);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_restart_replays_more_pending_entries_than_one_batch() {
    let redis = TestRedis::new().await;
    let producer = RedisStreamProducer::from_stream_def::<TestStream>(redis.connection());
    let ids: Vec<String> = (0..25).map(|i| format!("job-{:02}", i)).collect();
    for id in &ids {
        producer.enqueue(Ping::new(id, "Ping")).await.unwrap();
    }

    deliver_without_ack(&redis, "worker-1", 25).await;
    assert_eq!(pending_count(&redis).await, 25);

    // same consumer id, claiming out of the picture
    let config = WorkerConfig::from_stream_def::<TestStream>()
        .with_consumer_id("worker-1")
        .with_batch_size(10)
        .with_block_timeout_ms(100);
    let seen = run_until_seen(&redis, config, 25).await;

    assert_eq!(seen, ids);
    assert_eq!(pending_count(&redis).await, 0);
}
