//! Connection management for PostgreSQL and Redis
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL through SeaORM, plus migration running
//! - `redis` (default) - Redis `ConnectionManager` for the job queue
//!
//! # Examples
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "gym_api").await?;
//! ```
//!
//! ```ignore
//! use database::redis::{self, RedisConfig};
//!
//! let conn = redis::connect_with_retry(&RedisConfig::from_env()?.url, None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
