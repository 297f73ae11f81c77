//! Redis Streams backend.
//!
//! Jobs are XADDed to `STREAM_NAME` under the field `job`. Workers read
//! through a consumer group, XACK on success, re-XADD with a bumped retry
//! counter on retryable failures and XADD a [`DeadLetter`] to `DLQ_STREAM`
//! (field `data`) once retries run out.

mod producer;
mod worker;

pub use producer::RedisStreamProducer;
pub use worker::RedisStreamWorker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field holding the job JSON in the main stream.
pub(crate) const JOB_FIELD: &str = "job";
/// Field holding the [`DeadLetter`] JSON in the DLQ stream.
pub(crate) const DLQ_FIELD: &str = "data";

/// Entry written to the dead-letter stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub job_id: String,
    pub kind: String,
    /// Original job, or the raw payload as a string when it could not be parsed.
    pub job: serde_json::Value,
    pub error: String,
    pub retry_count: u32,
    pub original_stream_id: String,
    pub failed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_letter_serializes_job_inline() {
        let letter = DeadLetter {
            job_id: "42".into(),
            kind: "AnswerMail".into(),
            job: serde_json::json!({ "id": "42" }),
            error: "Processing error: bad address".into(),
            retry_count: 0,
            original_stream_id: "1-0".into(),
            failed_at: Utc::now(),
        };

        let value = serde_json::to_value(&letter).unwrap();
        assert_eq!(value["job"]["id"], "42");
        assert_eq!(value["kind"], "AnswerMail");
        assert_eq!(value["original_stream_id"], "1-0");
    }
}
