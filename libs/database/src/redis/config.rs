use core_config::{ConfigError, FromEnv, env_or_default};

/// `REDIS_URL`, default `redis://127.0.0.1:6379`.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_or_default("REDIS_URL", "redis://127.0.0.1:6379")))
    }
}
