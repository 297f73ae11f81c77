//! # Axum Helpers
//!
//! Shared HTTP plumbing for the gym services.
//!
//! - **[`errors`]**: `AppError`, the single error type every domain error
//!   converts into, rendered as `{"error": "<message>"}`
//! - **[`extractors`]**: `ValidatedJson` and `IdPath`
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly with API docs, health endpoints,
//!   graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let router = create_router::<ApiDoc>(Router::new())?;
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorResponse};
pub use extractors::{IdPath, ValidatedJson};
pub use http::{cors_layer_from_env, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, create_app, create_router, health_router,
    run_health_checks, shutdown_signal, shutdown_watch,
};
