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

use crate::error::StudentResult;
use crate::models::{
    CreateStudent, RemovedResponse, Student, StudentPage, StudentSearch, UpdateStudent,
};
use crate::repository::StudentRepository;
use crate::service::StudentService;

const TAG: &str = "students";

/// OpenAPI documentation for Students API
#[derive(OpenApi)]
#[openapi(
    paths(
        search_students,
        create_student,
        get_student,
        update_student,
        delete_student,
    ),
    components(
        schemas(Student, CreateStudent, UpdateStudent, StudentPage, RemovedResponse),
        responses(BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Student registration")
    )
)]
pub struct ApiDoc;

/// Student routes, rooted at `/students`.
pub fn router<R: StudentRepository + 'static>(service: StudentService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/students", get(search_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .with_state(shared_service)
}

/// Search students by name
#[utoipa::path(
    get,
    path = "/students",
    tag = TAG,
    params(StudentSearch),
    responses(
        (status = 200, description = "One page of students ordered by name", body = StudentPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_students<R: StudentRepository>(
    State(service): State<Arc<StudentService<R>>>,
    Query(search): Query<StudentSearch>,
) -> StudentResult<Json<StudentPage>> {
    let page = service.search_students(search).await?;
    Ok(Json(page))
}

/// Register a student
#[utoipa::path(
    post,
    path = "/students",
    tag = TAG,
    request_body = CreateStudent,
    responses(
        (status = 200, description = "Student registered", body = Student),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_student<R: StudentRepository>(
    State(service): State<Arc<StudentService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateStudent>,
) -> StudentResult<Json<Student>> {
    let student = service.create_student(input).await?;
    Ok(Json(student))
}

/// Get a student by id
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_student<R: StudentRepository>(
    State(service): State<Arc<StudentService<R>>>,
    IdPath(id): IdPath,
) -> StudentResult<Json<Student>> {
    let student = service.get_student(id).await?;
    Ok(Json(student))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Student id")),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_student<R: StudentRepository>(
    State(service): State<Arc<StudentService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateStudent>,
) -> StudentResult<Json<Student>> {
    let student = service.update_student(id, input).await?;
    Ok(Json(student))
}

/// Remove a student
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student removed", body = RemovedResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_student<R: StudentRepository>(
    State(service): State<Arc<StudentService<R>>>,
    IdPath(id): IdPath,
) -> StudentResult<Json<RemovedResponse>> {
    let removed = service.delete_student(id).await?;
    Ok(Json(removed))
}
