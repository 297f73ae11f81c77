//! Stream naming and per-kind dispatch.

use crate::error::StreamError;
use crate::job::{StreamJob, StreamProcessor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Names of the Redis keys a job family lives under.
///
/// ```ignore
/// pub struct MailStream;
///
/// impl StreamDef for MailStream {
///     const STREAM_NAME: &'static str = "mail:jobs";
///     const CONSUMER_GROUP: &'static str = "mail_workers";
///     const DLQ_STREAM: &'static str = "mail:dlq";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    const STREAM_NAME: &'static str;
    const CONSUMER_GROUP: &'static str;
    const DLQ_STREAM: &'static str;
    /// MAXLEN ~ applied on XADD.
    const MAX_LENGTH: i64 = 100_000;
}

/// Routes each job to the single processor registered for its kind.
///
/// The registry is itself a processor, so a worker only ever sees one.
/// A job whose kind has no handler fails permanently.
pub struct ProcessorRegistry<J: StreamJob> {
    handlers: HashMap<String, Arc<dyn StreamProcessor<J>>>,
}

impl<J: StreamJob> ProcessorRegistry<J> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `processor` for `kind`, replacing any previous handler.
    pub fn register<P>(&mut self, kind: impl Into<String>, processor: P) -> &mut Self
    where
        P: StreamProcessor<J> + 'static,
    {
        self.handlers.insert(kind.into(), Arc::new(processor));
        self
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl<J: StreamJob> Default for ProcessorRegistry<J> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<J: StreamJob> StreamProcessor<J> for ProcessorRegistry<J> {
    async fn process(&self, job: &J) -> Result<(), StreamError> {
        let handler = self.handlers.get(job.kind()).ok_or_else(|| {
            StreamError::permanent(format!("No handler registered for job kind '{}'", job.kind()))
        })?;

        debug!(job_id = %job.job_id(), kind = %job.kind(), handler = handler.name(), "Dispatching job");
        handler.process(job).await
    }

    fn name(&self) -> &'static str {
        "processor_registry"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        for handler in self.handlers.values() {
            if !handler.health_check().await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TestJob {
        pub id: String,
        pub kind: String,
        pub retry_count: u32,
    }

    impl TestJob {
        pub fn new(id: &str, kind: &str) -> Self {
            Self {
                id: id.to_string(),
                kind: kind.to_string(),
                retry_count: 0,
            }
        }
    }

    impl StreamJob for TestJob {
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

    #[derive(Default)]
    pub struct Recorder {
        pub seen: Arc<Mutex<Vec<TestJob>>>,
    }

    #[async_trait]
    impl StreamProcessor<TestJob> for Recorder {
        async fn process(&self, job: &TestJob) -> Result<(), StreamError> {
            self.seen.lock().unwrap().push(job.clone());
            Ok(())
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_kind() {
        let enrollment = Recorder::default();
        let answer = Recorder::default();
        let enrollment_seen = enrollment.seen.clone();
        let answer_seen = answer.seen.clone();

        let mut registry = ProcessorRegistry::new();
        registry
            .register("EnrollmentMail", enrollment)
            .register("AnswerMail", answer);

        registry.process(&TestJob::new("1", "AnswerMail")).await.unwrap();

        assert!(enrollment_seen.lock().unwrap().is_empty());
        assert_eq!(answer_seen.lock().unwrap().len(), 1);
        assert_eq!(registry.kinds(), vec!["AnswerMail", "EnrollmentMail"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_permanent() {
        let registry: ProcessorRegistry<TestJob> = ProcessorRegistry::new();
        let err = registry
            .process(&TestJob::new("1", "CheckinMail"))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Permanent);
        assert!(err.to_string().contains("CheckinMail"));
    }
}
