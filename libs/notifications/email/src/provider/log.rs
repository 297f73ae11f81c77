//! Development provider that only logs.

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Writes each message to the log instead of delivering it. Used when no
/// SMTP host is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmailProvider;

#[async_trait]
impl EmailProvider for LogEmailProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            template = ?email.template,
            body = email.body_text.as_deref().unwrap_or_default(),
            "Email not delivered (log provider)"
        );

        Ok(SendResult {
            message_id: format!("log-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
