use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudentError {
    /// Lookup by id failed on read or update.
    #[error("Invalid student id")]
    InvalidId,

    /// Lookup by id failed on delete.
    #[error("Student not found")]
    NotFound,

    #[error("Student already exists.")]
    AlreadyExists,

    #[error("This email is already registered.")]
    EmailTaken,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StudentResult<T> = Result<T, StudentError>;

impl From<StudentError> for AppError {
    fn from(err: StudentError) -> Self {
        match err {
            StudentError::InvalidId | StudentError::NotFound => AppError::NotFound(err.to_string()),
            StudentError::AlreadyExists | StudentError::EmailTaken => {
                AppError::Conflict(err.to_string())
            }
            StudentError::Validation(msg) => {
                tracing::debug!("Student validation failed: {}", msg);
                AppError::Validation(None)
            }
            StudentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub(crate) fn db_error(e: sea_orm::DbErr) -> StudentError {
    StudentError::Internal(format!("Database error: {}", e))
}
