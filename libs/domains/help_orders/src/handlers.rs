use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::HelpOrderResult;
use crate::models::{AnswerQuestion, HelpOrder, SubmitQuestion};
use crate::repository::HelpOrderRepository;
use crate::service::HelpOrderService;

const TAG: &str = "help-orders";

/// OpenAPI documentation for Help Orders API
#[derive(OpenApi)]
#[openapi(
    paths(
        submit_question,
        list_by_student,
        list_unanswered,
        answer_help_order,
    ),
    components(
        schemas(HelpOrder, SubmitQuestion, AnswerQuestion),
        responses(BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Student questions and staff answers")
    )
)]
pub struct ApiDoc;

pub fn router<R: HelpOrderRepository + 'static>(service: HelpOrderService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/students/{id}/help-orders",
            get(list_by_student).post(submit_question),
        )
        .route("/help-orders", get(list_unanswered))
        .route("/help-orders/{id}/answer", post(answer_help_order))
        .with_state(shared_service)
}

/// Ask a question
#[utoipa::path(
    post,
    path = "/students/{id}/help-orders",
    tag = TAG,
    params(("id" = i32, Path, description = "Student id")),
    request_body = SubmitQuestion,
    responses(
        (status = 200, description = "Question recorded", body = HelpOrder),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_question<R: HelpOrderRepository>(
    State(service): State<Arc<HelpOrderService<R>>>,
    IdPath(student_id): IdPath,
    ValidatedJson(input): ValidatedJson<SubmitQuestion>,
) -> HelpOrderResult<Json<HelpOrder>> {
    let help_order = service.submit_question(student_id, input).await?;
    Ok(Json(help_order))
}

/// A student's help orders
#[utoipa::path(
    get,
    path = "/students/{id}/help-orders",
    tag = TAG,
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Help orders ordered by id", body = [HelpOrder]),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_by_student<R: HelpOrderRepository>(
    State(service): State<Arc<HelpOrderService<R>>>,
    IdPath(student_id): IdPath,
) -> HelpOrderResult<Json<Vec<HelpOrder>>> {
    let help_orders = service.list_by_student(student_id).await?;
    Ok(Json(help_orders))
}

/// Questions waiting for an answer
#[utoipa::path(
    get,
    path = "/help-orders",
    tag = TAG,
    responses(
        (status = 200, description = "Unanswered help orders ordered by id", body = [HelpOrder]),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_unanswered<R: HelpOrderRepository>(
    State(service): State<Arc<HelpOrderService<R>>>,
) -> HelpOrderResult<Json<Vec<HelpOrder>>> {
    let help_orders = service.list_unanswered().await?;
    Ok(Json(help_orders))
}

/// Answer a help order
#[utoipa::path(
    post,
    path = "/help-orders/{id}/answer",
    tag = TAG,
    params(("id" = i32, Path, description = "Help order id")),
    request_body = AnswerQuestion,
    responses(
        (status = 200, description = "Answer stored, mail queued", body = HelpOrder),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn answer_help_order<R: HelpOrderRepository>(
    State(service): State<Arc<HelpOrderService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<AnswerQuestion>,
) -> HelpOrderResult<Json<HelpOrder>> {
    let help_order = service.answer(id, input).await?;
    Ok(Json(help_order))
}
