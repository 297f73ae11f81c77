use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_plans::PlanError;
use domain_students::StudentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Unknown student on create.
    #[error("This student does not exist")]
    StudentNotFound,

    /// Unknown student on update.
    #[error("Invalid student id")]
    InvalidStudentId,

    #[error("This student is already enrolled")]
    AlreadyEnrolled,

    #[error("This plan does not exist")]
    PlanNotFound,

    #[error("Invalid date")]
    InvalidDate,

    /// Unknown enrollment on read or update.
    #[error("This enrollment does not exist")]
    NotFound,

    /// Unknown enrollment on cancel.
    #[error("Invalid id")]
    InvalidId,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EnrollmentResult<T> = Result<T, EnrollmentError>;

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::StudentNotFound
            | EnrollmentError::InvalidStudentId
            | EnrollmentError::PlanNotFound
            | EnrollmentError::NotFound
            | EnrollmentError::InvalidId => AppError::NotFound(err.to_string()),
            EnrollmentError::AlreadyEnrolled => AppError::Conflict(err.to_string()),
            EnrollmentError::InvalidDate => AppError::InvalidInput(err.to_string()),
            EnrollmentError::Validation(msg) => {
                tracing::debug!("Enrollment validation failed: {}", msg);
                AppError::Validation(None)
            }
            EnrollmentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<StudentError> for EnrollmentError {
    fn from(err: StudentError) -> Self {
        EnrollmentError::Internal(format!("Student lookup failed: {}", err))
    }
}

impl From<PlanError> for EnrollmentError {
    fn from(err: PlanError) -> Self {
        EnrollmentError::Internal(format!("Plan lookup failed: {}", err))
    }
}

pub(crate) fn db_error(e: sea_orm::DbErr) -> EnrollmentError {
    EnrollmentError::Internal(format!("Database error: {}", e))
}
