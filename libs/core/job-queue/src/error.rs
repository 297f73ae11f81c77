//! Job errors and their retry categories.
//!
//! - **Transient**: temporary failure, retry with exponential backoff
//! - **Permanent**: retrying cannot help, give up immediately
//! - **RateLimited**: downstream asked us to slow down, longer backoff

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 3 retries, 1s doubling up to 30s
    Transient,
    /// no retry
    Permanent,
    /// 5 retries, 5s doubling up to 2min
    RateLimited,
}

impl ErrorCategory {
    pub fn max_retries(&self) -> u32 {
        match self {
            ErrorCategory::Transient => 3,
            ErrorCategory::Permanent => 0,
            ErrorCategory::RateLimited => 5,
        }
    }

    pub fn base_delay_ms(&self) -> u64 {
        match self {
            ErrorCategory::Transient => 1_000,
            ErrorCategory::Permanent => 0,
            ErrorCategory::RateLimited => 5_000,
        }
    }

    pub fn max_delay_ms(&self) -> u64 {
        match self {
            ErrorCategory::Transient => 30_000,
            ErrorCategory::Permanent => 0,
            ErrorCategory::RateLimited => 120_000,
        }
    }

    /// `base * 2^retry_count`, capped at the category maximum.
    pub fn backoff_delay_ms(&self, retry_count: u32) -> u64 {
        self.base_delay_ms()
            .saturating_mul(2u64.saturating_pow(retry_count))
            .min(self.max_delay_ms())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
            ErrorCategory::RateLimited => "rate_limited",
        }
    }
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Processing error: {message}")]
    Processing {
        message: String,
        category: ErrorCategory,
    },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The in-memory worker is gone; nothing will ever drain the channel.
    #[error("Job queue is closed")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StreamError {
    pub fn transient(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Transient,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Permanent,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        StreamError::RateLimited(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Redis(_) => ErrorCategory::Transient,
            StreamError::Serialization(_) => ErrorCategory::Permanent,
            StreamError::Processing { category, .. } => *category,
            StreamError::RateLimited(_) => ErrorCategory::RateLimited,
            StreamError::QueueClosed => ErrorCategory::Permanent,
            StreamError::Config(_) => ErrorCategory::Permanent,
            StreamError::Internal(_) => ErrorCategory::Transient,
        }
    }

    /// Whether a job that already failed `retry_count` times gets another go.
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count < self.category().max_retries()
    }

    pub fn backoff_delay_ms(&self, retry_count: u32) -> u64 {
        self.category().backoff_delay_ms(retry_count)
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}
