//! Shared application state.

use email::MailJob;
use job_queue::JobProducer;
use std::sync::Arc;

/// Connections and the mail producer, cloned into every router.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Present only with the Redis job queue
    pub redis: Option<database::redis::ConnectionManager>,
    /// Where enrollment and answer mails are enqueued
    pub mail: Arc<dyn JobProducer<MailJob>>,
}
