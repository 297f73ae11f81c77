//! Email provider implementations

pub mod log;
pub mod mock;
pub mod smtp;

pub use log::LogEmailProvider;
pub use mock::MockEmailProvider;
pub use smtp::SmtpProvider;

use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Result of sending an email
#[derive(Debug)]
pub struct SendResult {
    /// Provider-specific message ID
    pub message_id: String,
}

/// Mail sink used by the notification handlers.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &Email) -> Result<SendResult>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}
