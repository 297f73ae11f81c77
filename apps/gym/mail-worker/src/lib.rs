//! Mail Worker Service
//!
//! Consumes the mail stream written by the API when `JOB_QUEUE=redis`.
//!
//! ```text
//! Redis Stream (mail:jobs)
//!   ↓ (Consumer Group: mail_workers)
//! RedisStreamWorker<MailJob, ProcessorRegistry>
//!   ↓ EnrollmentMail / AnswerMail handlers
//! TemplateEngine (Handlebars)
//!   ↓
//! EmailProvider (SMTP, or log only)
//! ```
//!
//! Failed jobs are retried with backoff; permanent failures and jobs out of
//! retries land in `mail:dlq`. A small HTTP server exposes `/health`,
//! `/ready` and `/metrics`.

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::server::{HealthCheckFuture, health_router, run_health_checks, shutdown_watch};
use core_config::{Environment, FromEnv, app_info, env_parse};
use database::redis::{ConnectionManager, RedisConfig};
use email::{MailConfig, MailStream, Mailer, TemplateEngine, mail_registry};
use eyre::{Result, WrapErr};
use job_queue::{RedisStreamWorker, WorkerConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Worker settings on top of the shared Redis and mail configs.
#[derive(Clone, Debug)]
pub struct WorkerSettings {
    /// `MAIL_WORKER_HEALTH_PORT`, default 8081. Not `PORT`, which the API uses.
    pub health_port: u16,
    /// `MAIL_WORKER_CONSUMER_ID`; a random id when unset.
    pub consumer_id: Option<String>,
}

impl FromEnv for WorkerSettings {
    fn from_env() -> Result<Self, core_config::ConfigError> {
        Ok(Self {
            health_port: env_parse("MAIL_WORKER_HEALTH_PORT", 8081u16)?,
            consumer_id: std::env::var("MAIL_WORKER_CONSUMER_ID")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Stream settings for this process.
pub fn worker_config(settings: &WorkerSettings) -> WorkerConfig {
    let config = WorkerConfig::from_stream_def::<MailStream>();
    match &settings.consumer_id {
        Some(id) => config.with_consumer_id(id),
        None => config,
    }
}

async fn ready_handler(State(redis): State<ConnectionManager>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "redis",
        Box::pin(async {
            database::redis::check_health(&redis)
                .await
                .map_err(|e| e.to_string())
        }),
    )];
    run_health_checks(checks).await
}

async fn metrics_handler() -> String {
    job_queue::render_metrics()
}

async fn start_health_server(redis: ConnectionManager, port: u16) -> Result<()> {
    let app: Router = Router::new()
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(redis)
        .merge(health_router(app_info!()));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {}", addr))?;

    info!(port = %port, "Health server listening");
    axum::serve(listener, app)
        .await
        .wrap_err("Health server failed")?;
    Ok(())
}

pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();

    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);
    job_queue::init_metrics()?;

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting mail worker");

    let settings = WorkerSettings::from_env()?;
    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    let mail_config = MailConfig::from_env().wrap_err("Failed to load mail configuration")?;

    let redis = database::redis::connect_with_retry(&redis_config.url, None)
        .await
        .wrap_err("Failed to connect to Redis")?;

    let provider = mail_config.build_provider()?;
    let templates = TemplateEngine::new().wrap_err("Failed to load mail templates")?;
    let mailer = Mailer::new(provider, templates, mail_config.sender());

    let config = worker_config(&settings);
    info!(
        stream = %config.stream_name,
        consumer_group = %config.consumer_group,
        consumer_id = %config.consumer_id,
        "Worker configuration loaded"
    );

    let health_redis = redis.clone();
    let health_port = settings.health_port;
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_redis, health_port).await {
            error!(error = %e, "Health server failed");
        }
    });

    let worker = RedisStreamWorker::new(redis, mail_registry(mailer), config);
    worker
        .run(shutdown_watch())
        .await
        .wrap_err("Mail worker failed")?;

    info!("Mail worker stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        temp_env::with_vars_unset(["MAIL_WORKER_HEALTH_PORT", "MAIL_WORKER_CONSUMER_ID"], || {
            let settings = WorkerSettings::from_env().unwrap();
            assert_eq!(settings.health_port, 8081);
            assert!(settings.consumer_id.is_none());

            let config = worker_config(&settings);
            assert_eq!(config.stream_name, "mail:jobs");
            assert_eq!(config.consumer_group, "mail_workers");
            assert_eq!(config.dlq_stream, "mail:dlq");
            assert!(config.consumer_id.starts_with("worker-"));
        });
    }

    #[test]
    fn test_fixed_consumer_id() {
        temp_env::with_var("MAIL_WORKER_CONSUMER_ID", Some("mail-1"), || {
            let settings = WorkerSettings::from_env().unwrap();
            assert_eq!(worker_config(&settings).consumer_id, "mail-1");
        });
    }
}
