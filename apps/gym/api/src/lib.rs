//! Gym API
//!
//! HTTP server for students, plans, enrollments and help orders.
//!
//! ## Start-up
//!
//! 1. configuration from the environment, tracing, metrics recorder
//! 2. PostgreSQL with retry, then pending migrations
//! 3. the mail producer chosen by `JOB_QUEUE` (`memory` runs the mail
//!    worker in this process, `redis` leaves it to `gym-mail-worker`)
//! 4. routes under `/api`, plus `/health`, `/ready` and `/metrics`

pub mod api;
pub mod config;
pub mod openapi;
pub mod queue;
pub mod state;

use axum::Router;
use axum_helpers::server::{create_app, create_router, health_router, shutdown_watch};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::WrapErr;
use migration::Migrator;
use tracing::info;

use config::{Config, QueueBackend};
use state::AppState;

/// API routes with docs and layers, plus the root-level ops endpoints.
pub fn build_router(state: AppState) -> eyre::Result<Router> {
    let router = create_router::<openapi::ApiDoc>(api::routes(&state))?
        .merge(health_router(state.config.app))
        .merge(api::ops_router(state));
    Ok(router)
}

pub async fn run() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    job_queue::init_metrics()?;

    info!(name = %config.app.name, version = %config.app.version, queue = ?config.queue, "Starting gym API");

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .wrap_err("PostgreSQL connection failed")?;
    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .wrap_err("Database migrations failed")?;

    let redis = match config.queue {
        QueueBackend::Redis => Some(
            database::redis::connect_with_retry(&config.redis.url, None)
                .await
                .wrap_err("Redis connection failed")?,
        ),
        QueueBackend::Memory => None,
    };

    let mail = queue::mail_producer(redis.clone(), &config.mail, shutdown_watch())?;

    let state = AppState {
        config,
        db,
        redis,
        mail,
    };
    let server = state.config.server.clone();
    let db = state.db.clone();

    create_app(build_router(state)?, &server).await?;

    if let Err(e) = db.close().await {
        tracing::error!("Error closing PostgreSQL: {}", e);
    }
    info!("Gym API shutdown complete");
    Ok(())
}
