use crate::provider::{EmailProvider, LogEmailProvider, SmtpProvider};
use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse, env_required};
use std::sync::Arc;

/// SMTP transport settings.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS relay when true, plain connection otherwise.
    pub use_tls: bool,
}

impl FromEnv for SmtpConfig {
    /// `SMTP_HOST` (required), `SMTP_PORT` (587), `SMTP_USERNAME`,
    /// `SMTP_PASSWORD`, `SMTP_TLS` (true).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse("SMTP_PORT", 587u16)?,
            username: std::env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty()),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: env_flag("SMTP_TLS", true)?,
        })
    }
}

/// Sender identity plus the transport to use.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub from_name: String,
    pub from_email: String,
    /// `None` when `SMTP_HOST` is unset; mail is then only logged.
    pub smtp: Option<SmtpConfig>,
}

impl MailConfig {
    /// `From` mailbox, `Name <address>`.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn build_provider(&self) -> eyre::Result<Arc<dyn EmailProvider>> {
        match &self.smtp {
            Some(smtp) => {
                tracing::info!(host = %smtp.host, port = smtp.port, "Using SMTP mail provider");
                Ok(Arc::new(SmtpProvider::new(smtp, self.sender())?))
            }
            None => {
                tracing::warn!("SMTP_HOST not set, mail will only be logged");
                Ok(Arc::new(LogEmailProvider))
            }
        }
    }
}

impl FromEnv for MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) if !host.is_empty() => Some(SmtpConfig::from_env()?),
            _ => None,
        };

        Ok(Self {
            from_name: env_or_default("MAIL_FROM_NAME", "Gym"),
            from_email: env_or_default("MAIL_FROM_EMAIL", "noreply@gym.local"),
            smtp,
        })
    }
}
