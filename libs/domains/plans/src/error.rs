use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Lookup by id failed on read or update.
    #[error("Invalid plan id")]
    InvalidId,

    /// Lookup by id failed on delete.
    #[error("Plan not found")]
    NotFound,

    #[error("This plan already exists.")]
    AlreadyExists,

    #[error("This plan is already registered.")]
    TitleTaken,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PlanResult<T> = Result<T, PlanError>;

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidId | PlanError::NotFound => AppError::NotFound(err.to_string()),
            PlanError::AlreadyExists | PlanError::TitleTaken => AppError::Conflict(err.to_string()),
            PlanError::Validation(msg) => {
                tracing::debug!("Plan validation failed: {}", msg);
                AppError::Validation(None)
            }
            PlanError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub(crate) fn db_error(e: sea_orm::DbErr) -> PlanError {
    PlanError::Internal(format!("Database error: {}", e))
}
