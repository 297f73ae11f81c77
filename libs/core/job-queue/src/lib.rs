//! Job Queue
//!
//! The producer/consumer pair behind every notification side effect.
//! Request handlers enqueue a job and move on; a worker picks it up later,
//! runs the processor registered for the job's kind, and retries or drops
//! it according to the error category.
//!
//! ## Backends
//!
//! - **In-memory** ([`InMemoryQueue`] + [`InMemoryWorker`]): an unbounded
//!   tokio channel drained by a task in the same process. No durability
//!   across restarts; used for development and tests.
//! - **Redis Streams** ([`RedisStreamProducer`] + [`RedisStreamWorker`]):
//!   consumer groups, acknowledgement, re-queue with a retry counter and a
//!   dead-letter stream. The worker usually runs as its own process.
//!
//! ## Example
//!
//! ```ignore
//! use job_queue::{InMemoryQueue, ProcessorRegistry, JobProducer};
//!
//! let mut registry = ProcessorRegistry::new();
//! registry.register("EnrollmentMail", enrollment_mail_handler);
//!
//! let (queue, receiver) = InMemoryQueue::<MailJob>::channel("mail");
//! tokio::spawn(receiver.into_worker(registry).run(shutdown_rx));
//!
//! queue.enqueue(job).await?;
//! ```

mod config;
mod error;
mod job;
mod memory;
pub mod metrics;
mod producer;
mod redis_streams;
mod registry;

pub use config::WorkerConfig;
pub use error::{ErrorCategory, StreamError};
pub use job::{StreamJob, StreamProcessor};
pub use memory::{InMemoryQueue, InMemoryReceiver, InMemoryWorker};
pub use metrics::{JobMetrics, init_metrics, render_metrics};
pub use producer::JobProducer;
pub use redis_streams::{DeadLetter, RedisStreamProducer, RedisStreamWorker};
pub use registry::{ProcessorRegistry, StreamDef};
