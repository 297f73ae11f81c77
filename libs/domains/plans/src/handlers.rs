use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PlanResult;
use crate::models::{
    CreatePlan, RemovedResponse, Plan, PlanPage, PlanSearch, UpdatePlan,
};
use crate::repository::PlanRepository;
use crate::service::PlanService;

const TAG: &str = "plans";

/// OpenAPI documentation for Students API
#[derive(OpenApi)]
#[openapi(
    paths(
        search_plans,
        create_plan,
        get_plan,
        update_plan,
        delete_plan,
    ),
    components(
        schemas(Plan, CreatePlan, UpdatePlan, PlanPage, RemovedResponse),
        responses(BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Subscription plans")
    )
)]
pub struct ApiDoc;

/// Plan routes, rooted at `/plans`.
pub fn router<R: PlanRepository + 'static>(service: PlanService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/plans", get(search_plans).post(create_plan))
        .route(
            "/plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .with_state(shared_service)
}

/// Search plans by title
#[utoipa::path(
    get,
    path = "/plans",
    tag = TAG,
    params(PlanSearch),
    responses(
        (status = 200, description = "One page of plans ordered by duration", body = PlanPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_plans<R: PlanRepository>(
    State(service): State<Arc<PlanService<R>>>,
    Query(search): Query<PlanSearch>,
) -> PlanResult<Json<PlanPage>> {
    let page = service.search_plans(search).await?;
    Ok(Json(page))
}

/// Create a plan
#[utoipa::path(
    post,
    path = "/plans",
    tag = TAG,
    request_body = CreatePlan,
    responses(
        (status = 200, description = "Plan created", body = Plan),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_plan<R: PlanRepository>(
    State(service): State<Arc<PlanService<R>>>,
    ValidatedJson(input): ValidatedJson<CreatePlan>,
) -> PlanResult<Json<Plan>> {
    let plan = service.create_plan(input).await?;
    Ok(Json(plan))
}

/// Get a plan by id
#[utoipa::path(
    get,
    path = "/plans/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan found", body = Plan),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_plan<R: PlanRepository>(
    State(service): State<Arc<PlanService<R>>>,
    IdPath(id): IdPath,
) -> PlanResult<Json<Plan>> {
    let plan = service.get_plan(id).await?;
    Ok(Json(plan))
}

/// Update a plan
#[utoipa::path(
    put,
    path = "/plans/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Plan id")),
    request_body = UpdatePlan,
    responses(
        (status = 200, description = "Plan updated", body = Plan),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_plan<R: PlanRepository>(
    State(service): State<Arc<PlanService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdatePlan>,
) -> PlanResult<Json<Plan>> {
    let plan = service.update_plan(id, input).await?;
    Ok(Json(plan))
}

/// Remove a plan
#[utoipa::path(
    delete,
    path = "/plans/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan removed", body = RemovedResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_plan<R: PlanRepository>(
    State(service): State<Arc<PlanService<R>>>,
    IdPath(id): IdPath,
) -> PlanResult<Json<RemovedResponse>> {
    let removed = service.delete_plan(id).await?;
    Ok(Json(removed))
}
