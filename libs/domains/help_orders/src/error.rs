use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_students::StudentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelpOrderError {
    #[error("Invalid student id")]
    InvalidStudentId,

    #[error("Invalid help order")]
    NotFound,

    #[error("This help order has already been answered")]
    AlreadyAnswered,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HelpOrderResult<T> = Result<T, HelpOrderError>;

impl From<HelpOrderError> for AppError {
    fn from(err: HelpOrderError) -> Self {
        match err {
            HelpOrderError::InvalidStudentId | HelpOrderError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            HelpOrderError::AlreadyAnswered => AppError::Conflict(err.to_string()),
            HelpOrderError::Validation(msg) => {
                tracing::debug!("Help order validation failed: {}", msg);
                AppError::Validation(None)
            }
            HelpOrderError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for HelpOrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<StudentError> for HelpOrderError {
    fn from(err: StudentError) -> Self {
        HelpOrderError::Internal(format!("Student lookup failed: {}", err))
    }
}

pub(crate) fn db_error(e: sea_orm::DbErr) -> HelpOrderError {
    HelpOrderError::Internal(format!("Database error: {}", e))
}
