//! Mail job queue selection.

use database::redis::ConnectionManager;
use email::{MailConfig, MailJob, MailStream, Mailer, TemplateEngine, mail_registry};
use eyre::WrapErr;
use job_queue::{InMemoryQueue, JobProducer, RedisStreamProducer};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Builds the mail producer.
///
/// With Redis the jobs are consumed by the separate mail worker. Without it
/// the worker runs as a task of this process and stops on `shutdown`.
pub fn mail_producer(
    redis: Option<ConnectionManager>,
    mail: &MailConfig,
    shutdown: watch::Receiver<bool>,
) -> eyre::Result<Arc<dyn JobProducer<MailJob>>> {
    match redis {
        Some(conn) => {
            info!("Mail jobs go to the Redis stream");
            Ok(Arc::new(RedisStreamProducer::from_stream_def::<MailStream>(
                conn,
            )))
        }
        None => {
            let provider = mail.build_provider()?;
            let templates = TemplateEngine::new().wrap_err("Failed to load mail templates")?;
            let mailer = Mailer::new(provider, templates, mail.sender());

            let (queue, receiver) = InMemoryQueue::channel("mail");
            let worker = receiver.into_worker(mail_registry(mailer));
            tokio::spawn(worker.run(shutdown));

            info!("Mail jobs are processed in-process");
            Ok(Arc::new(queue))
        }
    }
}
