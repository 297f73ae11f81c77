//! Handler tests for the enrollments domain
//!
//! Students and plans are seeded straight through their in-memory
//! repositories; the enrollment routes are driven over HTTP.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Days, NaiveDate};
use domain_enrollments::*;
use domain_plans::{CreatePlan, InMemoryPlanRepository, PgPlanRepository, PlanRepository};
use domain_students::{
    CreateStudent, InMemoryStudentRepository, PgStudentRepository, StudentRepository,
};
use email::{MailJob, MailPayload};
use http_body_util::BodyExt;
use job_queue::{InMemoryQueue, InMemoryReceiver};
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestDatabase};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn send(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

struct TestApp {
    router: Router,
    mail: InMemoryReceiver<MailJob>,
}

/// Two students (ids 1, 2) and two plans: Gold (id 1, 3 months at 100)
/// and Start (id 2, 1 month at 129).
async fn memory_app() -> TestApp {
    let students = Arc::new(InMemoryStudentRepository::new());
    let plans = Arc::new(InMemoryPlanRepository::new());

    for name in ["Ana", "Bruno"] {
        students
            .create(CreateStudent {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                age: 28,
                weight: 70.0,
                height: 1.75,
            })
            .await
            .unwrap();
    }
    for (title, duration, price) in [("Gold", 3, 100.0), ("Start", 1, 129.0)] {
        plans
            .create(CreatePlan {
                title: title.to_string(),
                duration,
                price,
            })
            .await
            .unwrap();
    }

    let (queue, mail) = InMemoryQueue::channel("mail");
    let service = EnrollmentService::new(
        InMemoryEnrollmentRepository::new(),
        students,
        plans,
        Arc::new(queue),
    );

    TestApp {
        router: handlers::router(service),
        mail,
    }
}

fn yesterday() -> String {
    chrono::Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_create_enrollment_computes_end_date_and_price() {
    let mut app = memory_app().await;

    let response = app
        .router
        .clone()
        .oneshot(send(
            "POST",
            "/enrollments",
            json!({ "student_id": 1, "plan_id": 1, "start_date": "2030-01-10" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let enrollment: Enrollment = json_body(response.into_body()).await;
    assert_eq!(enrollment.end_date, NaiveDate::from_ymd_opt(2030, 4, 10).unwrap());
    assert_eq!(enrollment.price, 300.0);
    assert!(!enrollment.active);

    let job = app.mail.try_recv().expect("confirmation mail queued");
    assert!(matches!(job.payload, MailPayload::EnrollmentMail(_)));
}

#[tokio::test]
async fn test_create_enrollment_rule_violations() {
    let mut app = memory_app().await;

    let cases = [
        (json!({ "student_id": 9, "plan_id": 1, "start_date": "2030-01-10" }), "This student does not exist"),
        (json!({ "student_id": 1, "plan_id": 9, "start_date": "2030-01-10" }), "This plan does not exist"),
        (json!({ "student_id": 1, "plan_id": 1, "start_date": yesterday() }), "Invalid date"),
    ];

    for (body, message) in cases {
        let response = app
            .router
            .clone()
            .oneshot(send("POST", "/enrollments", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["error"], message);
    }

    assert!(app.mail.try_recv().is_none());
}

#[tokio::test]
async fn test_create_enrollment_twice_for_same_student() {
    let app = memory_app().await;
    let body = json!({ "student_id": 1, "plan_id": 1, "start_date": "2030-01-10" });

    let first = app
        .router
        .clone()
        .oneshot(send("POST", "/enrollments", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .router
        .oneshot(send("POST", "/enrollments", body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(second.into_body()).await;
    assert_eq!(body["error"], "This student is already enrolled");
}

#[tokio::test]
async fn test_create_enrollment_malformed_body() {
    let app = memory_app().await;

    let response = app
        .router
        .oneshot(send(
            "POST",
            "/enrollments",
            json!({ "student_id": 1, "start_date": "not-a-date" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn test_index_and_list_include_student_and_plan() {
    let app = memory_app().await;

    for student_id in [1, 2] {
        app.router
            .clone()
            .oneshot(send(
                "POST",
                "/enrollments",
                json!({ "student_id": student_id, "plan_id": 2, "start_date": "2030-01-31" }),
            ))
            .await
            .unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(empty("GET", "/enrollments"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["student"], json!({ "id": 1, "name": "Ana" }));
    assert_eq!(list[1]["plan"], json!({ "id": 2, "title": "Start" }));
    assert_eq!(list[0]["end_date"], "2030-02-28");

    let response = app
        .router
        .clone()
        .oneshot(empty("GET", "/enrollments/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let index: Value = json_body(response.into_body()).await;
    assert_eq!(index, list[1]);

    let response = app
        .router
        .oneshot(empty("GET", "/enrollments/9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "This enrollment does not exist");
}

#[tokio::test]
async fn test_update_enrollment() {
    let mut app = memory_app().await;

    app.router
        .clone()
        .oneshot(send(
            "POST",
            "/enrollments",
            json!({ "student_id": 1, "plan_id": 1, "start_date": "2030-01-10" }),
        ))
        .await
        .unwrap();
    app.mail.try_recv().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(send(
            "PUT",
            "/enrollments/1",
            json!({ "student_id": 1, "plan_id": 2, "start_date": "2030-03-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let enrollment: Enrollment = json_body(response.into_body()).await;
    assert_eq!(enrollment.plan_id, 2);
    assert_eq!(enrollment.end_date, NaiveDate::from_ymd_opt(2030, 4, 1).unwrap());
    assert_eq!(enrollment.price, 129.0);
    assert!(app.mail.try_recv().is_none());

    let response = app
        .router
        .oneshot(send(
            "PUT",
            "/enrollments/7",
            json!({ "student_id": 1, "plan_id": 2, "start_date": "2030-03-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "This enrollment does not exist");
}

#[tokio::test]
async fn test_cancel_enrollment() {
    let app = memory_app().await;

    app.router
        .clone()
        .oneshot(send(
            "POST",
            "/enrollments",
            json!({ "student_id": 1, "plan_id": 1, "start_date": "2030-01-10" }),
        ))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(empty("DELETE", "/enrollments/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let canceled: Enrollment = json_body(response.into_body()).await;
    assert!(canceled.canceled_at.is_some());
    assert!(!canceled.active);

    let response = app
        .router
        .clone()
        .oneshot(empty("DELETE", "/enrollments/1"))
        .await
        .unwrap();
    let again: Enrollment = json_body(response.into_body()).await;
    assert_eq!(again.canceled_at, canceled.canceled_at);

    let response = app
        .router
        .oneshot(empty("DELETE", "/enrollments/5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Invalid id");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_postgres_enrollment_lifecycle() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("pg_enrollment_lifecycle");

    let students = Arc::new(PgStudentRepository::new(db.connection()));
    let plans = Arc::new(PgPlanRepository::new(db.connection()));

    let student = students
        .create(CreateStudent {
            name: builder.name("Student", "ana"),
            email: builder.email("ana"),
            age: 30,
            weight: 65.0,
            height: 1.7,
        })
        .await
        .unwrap();
    let plan = plans
        .create(CreatePlan {
            title: builder.name("Plan", "gold"),
            duration: 3,
            price: 100.0,
        })
        .await
        .unwrap();

    let (queue, mut mail) = InMemoryQueue::channel("mail");
    let repository = PgEnrollmentRepository::new(db.connection());
    let service = EnrollmentService::new(repository.clone(), students, plans, Arc::new(queue));

    let input = CreateEnrollment {
        student_id: student.id,
        plan_id: plan.id,
        start_date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
    };
    let enrollment = service.create_enrollment(input.clone()).await.unwrap();
    assert_eq!(enrollment.end_date, NaiveDate::from_ymd_opt(2030, 4, 10).unwrap());
    assert!(mail.try_recv().is_some());

    let duplicate = service.create_enrollment(input).await;
    assert!(matches!(duplicate, Err(EnrollmentError::AlreadyEnrolled)));

    let canceled = service.cancel_enrollment(enrollment.id).await.unwrap();
    let again = service.cancel_enrollment(enrollment.id).await.unwrap();
    assert_eq!(canceled.canceled_at, again.canceled_at);

    let details = service.get_enrollment(enrollment.id).await.unwrap();
    assert_eq!(details.student.unwrap().id, student.id);
}
