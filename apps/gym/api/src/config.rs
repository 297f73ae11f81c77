use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use email::MailConfig;

pub use core_config::Environment;

/// Where mail jobs go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueBackend {
    /// Channel drained by a worker task inside the API process.
    Memory,
    /// Redis stream consumed by `gym-mail-worker`.
    Redis,
}

impl FromEnv for QueueBackend {
    /// `JOB_QUEUE`, default `memory`.
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("JOB_QUEUE", "memory");
        match raw.to_ascii_lowercase().as_str() {
            "memory" => Ok(QueueBackend::Memory),
            "redis" => Ok(QueueBackend::Redis),
            _ => Err(ConfigError::ParseError {
                key: "JOB_QUEUE".to_string(),
                details: format!("expected 'memory' or 'redis', got '{}'", raw),
            }),
        }
    }
}

/// API configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub queue: QueueBackend,
    /// Only connected when `queue` is [`QueueBackend::Redis`].
    pub redis: RedisConfig,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?, // Required
            queue: QueueBackend::from_env()?,
            redis: RedisConfig::from_env()?,
            mail: MailConfig::from_env()?,
        })
    }
}
