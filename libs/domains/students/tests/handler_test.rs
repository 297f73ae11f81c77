//! Handler tests for the students domain
//!
//! The in-memory tests exercise routing, status codes and error bodies.
//! The PostgreSQL tests at the bottom cover the ILIKE search and the unique
//! email constraint and need Docker.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_students::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::{TestDataBuilder, TestDatabase};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn student_json(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "age": 27,
        "weight": 72.4,
        "height": 1.81
    })
}

fn memory_app() -> Router {
    handlers::router(StudentService::new(InMemoryStudentRepository::new()))
}

#[tokio::test]
async fn test_create_student_returns_student() {
    let app = memory_app();

    let response = app
        .oneshot(post("/students", student_json("Ana Souza", "ana@example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let student: Student = json_body(response.into_body()).await;
    assert_eq!(student.id, 1);
    assert_eq!(student.email, "ana@example.com");
}

#[tokio::test]
async fn test_create_student_rejects_invalid_body() {
    let app = memory_app();

    let response = app
        .oneshot(post(
            "/students",
            json!({ "name": "Ana", "email": "not-an-email", "age": 27, "weight": 70.0, "height": 1.7 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn test_create_student_duplicate_email() {
    let app = memory_app();

    let first = app
        .clone()
        .oneshot(post("/students", student_json("Ana", "ana@example.com")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post("/students", student_json("Ana Two", "ana@example.com")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(second.into_body()).await;
    assert_eq!(body["error"], "Student already exists.");
}

#[tokio::test]
async fn test_get_student_unknown_and_malformed_ids() {
    let app = memory_app();

    let response = app.clone().oneshot(get("/students/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Invalid student id");

    let response = app.oneshot(get("/students/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Invalid id");
}

#[tokio::test]
async fn test_search_students_pages_by_name() {
    let app = memory_app();

    for i in 0..11 {
        let response = app
            .clone()
            .oneshot(post(
                "/students",
                student_json(&format!("Carla {:02}", i), &format!("carla{}@example.com", i)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    app.clone()
        .oneshot(post("/students", student_json("Diego", "diego@example.com")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/students?name=carla&page=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: StudentPage = json_body(response.into_body()).await;
    assert_eq!(page.page, 2);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.students.len(), 1);
    assert_eq!(page.students[0].name, "Carla 10");

    let response = app.oneshot(get("/students")).await.unwrap();
    let page: StudentPage = json_body(response.into_body()).await;
    assert_eq!(page.page, 1);
    assert_eq!(page.students.len(), 10);
}

#[tokio::test]
async fn test_update_student_email_conflict() {
    let app = memory_app();

    app.clone()
        .oneshot(post("/students", student_json("Ana", "ana@example.com")))
        .await
        .unwrap();
    app.clone()
        .oneshot(post("/students", student_json("Bruno", "bruno@example.com")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(put("/students/1", json!({ "email": "bruno@example.com" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "This email is already registered.");

    let response = app
        .oneshot(put("/students/1", json!({ "weight": 68.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let student: Student = json_body(response.into_body()).await;
    assert_eq!(student.weight, 68.0);
}

#[tokio::test]
async fn test_delete_student() {
    let app = memory_app();

    app.clone()
        .oneshot(post("/students", student_json("Ana", "ana@example.com")))
        .await
        .unwrap();

    let response = app.clone().oneshot(delete("/students/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "msg": "The student was successfully removed" }));

    let response = app.oneshot(delete("/students/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Student not found");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_postgres_search_is_case_insensitive() {
    let db = TestDatabase::new().await;
    let service = StudentService::new(PgStudentRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("pg_student_search");

    for label in ["zoe", "yara"] {
        service
            .create_student(CreateStudent {
                name: builder.name("Student", label),
                email: builder.email(label),
                age: 30,
                weight: 65.0,
                height: 1.7,
            })
            .await
            .unwrap();
    }

    let app = handlers::router(service);
    let response = app.oneshot(get("/students?name=STUDENT")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page: StudentPage = json_body(response.into_body()).await;
    assert_eq!(page.students.len(), 2);
    assert_eq!(page.last_page, 1);
    assert!(page.students[0].name < page.students[1].name);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_postgres_duplicate_email_is_rejected() {
    let db = TestDatabase::new().await;
    let repo = PgStudentRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_student_duplicate");

    let input = CreateStudent {
        name: builder.name("Student", "dup"),
        email: builder.email("dup"),
        age: 30,
        weight: 65.0,
        height: 1.7,
    };

    repo.create(input.clone()).await.unwrap();
    let result = repo.create(input).await;
    assert!(matches!(result, Err(StudentError::AlreadyExists)));
}
