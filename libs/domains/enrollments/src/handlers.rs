use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EnrollmentResult;
use crate::models::{
    CreateEnrollment, Enrollment, EnrollmentDetails, PlanSummary, StudentSummary,
    UpdateEnrollment,
};
use crate::repository::EnrollmentRepository;
use crate::service::EnrollmentService;

const TAG: &str = "enrollments";

/// OpenAPI documentation for Enrollments API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_enrollments,
        create_enrollment,
        get_enrollment,
        update_enrollment,
        cancel_enrollment,
    ),
    components(
        schemas(
            Enrollment,
            EnrollmentDetails,
            CreateEnrollment,
            UpdateEnrollment,
            StudentSummary,
            PlanSummary
        ),
        responses(BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Student enrollments in plans")
    )
)]
pub struct ApiDoc;

/// Enrollment routes, rooted at `/enrollments`.
pub fn router<R: EnrollmentRepository + 'static>(service: EnrollmentService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(cancel_enrollment),
        )
        .with_state(shared_service)
}

/// List every enrollment
#[utoipa::path(
    get,
    path = "/enrollments",
    tag = TAG,
    responses(
        (status = 200, description = "Enrollments ordered by id", body = [EnrollmentDetails]),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_enrollments<R: EnrollmentRepository>(
    State(service): State<Arc<EnrollmentService<R>>>,
) -> EnrollmentResult<Json<Vec<EnrollmentDetails>>> {
    let enrollments = service.list_enrollments().await?;
    Ok(Json(enrollments))
}

/// Enroll a student in a plan
#[utoipa::path(
    post,
    path = "/enrollments",
    tag = TAG,
    request_body = CreateEnrollment,
    responses(
        (status = 200, description = "Enrollment created, confirmation mail queued", body = Enrollment),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_enrollment<R: EnrollmentRepository>(
    State(service): State<Arc<EnrollmentService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateEnrollment>,
) -> EnrollmentResult<Json<Enrollment>> {
    let enrollment = service.create_enrollment(input).await?;
    Ok(Json(enrollment))
}

/// Get an enrollment with its student and plan
#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment found", body = EnrollmentDetails),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_enrollment<R: EnrollmentRepository>(
    State(service): State<Arc<EnrollmentService<R>>>,
    IdPath(id): IdPath,
) -> EnrollmentResult<Json<EnrollmentDetails>> {
    let enrollment = service.get_enrollment(id).await?;
    Ok(Json(enrollment))
}

/// Change the student, plan or start date of an enrollment
#[utoipa::path(
    put,
    path = "/enrollments/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Enrollment id")),
    request_body = UpdateEnrollment,
    responses(
        (status = 200, description = "Enrollment updated", body = Enrollment),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_enrollment<R: EnrollmentRepository>(
    State(service): State<Arc<EnrollmentService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateEnrollment>,
) -> EnrollmentResult<Json<Enrollment>> {
    let enrollment = service.update_enrollment(id, input).await?;
    Ok(Json(enrollment))
}

/// Cancel an enrollment
#[utoipa::path(
    delete,
    path = "/enrollments/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment canceled", body = Enrollment),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_enrollment<R: EnrollmentRepository>(
    State(service): State<Arc<EnrollmentService<R>>>,
    IdPath(id): IdPath,
) -> EnrollmentResult<Json<Enrollment>> {
    let enrollment = service.cancel_enrollment(id).await?;
    Ok(Json(enrollment))
}
