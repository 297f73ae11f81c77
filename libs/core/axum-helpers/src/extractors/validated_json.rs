//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that also runs `Validate`.
///
/// A body that does not parse and a body that parses but fails validation
/// are both rejected with `400 {"error": "Validation failed"}`. Field errors
/// from the validator are attached under `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct SubmitQuestion {
///     #[validate(length(min = 1))]
///     question: String,
/// }
///
/// async fn submit(ValidatedJson(input): ValidatedJson<SubmitQuestion>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "Rejected JSON body");
            AppError::Validation(None).into_response()
        })?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
