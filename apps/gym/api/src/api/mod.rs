use axum::{Router, routing::get};
use std::sync::Arc;

use domain_enrollments::{EnrollmentService, PgEnrollmentRepository};
use domain_help_orders::{HelpOrderService, PgHelpOrderRepository};
use domain_plans::{PgPlanRepository, PlanRepository, PlanService};
use domain_students::{PgStudentRepository, StudentRepository, StudentService};

pub mod health;

use crate::state::AppState;

/// Domain routes without the `/api` prefix; `create_router` adds it.
pub fn routes(state: &AppState) -> Router {
    let students: Arc<dyn StudentRepository> = Arc::new(PgStudentRepository::new(state.db.clone()));
    let plans: Arc<dyn PlanRepository> = Arc::new(PgPlanRepository::new(state.db.clone()));

    let enrollments = EnrollmentService::new(
        PgEnrollmentRepository::new(state.db.clone()),
        students.clone(),
        plans,
        state.mail.clone(),
    );
    let help_orders = HelpOrderService::new(
        PgHelpOrderRepository::new(state.db.clone()),
        students,
        state.mail.clone(),
    );

    Router::new()
        .merge(domain_students::handlers::router(StudentService::new(
            PgStudentRepository::new(state.db.clone()),
        )))
        .merge(domain_plans::handlers::router(PlanService::new(
            PgPlanRepository::new(state.db.clone()),
        )))
        .merge(domain_enrollments::handlers::router(enrollments))
        .merge(domain_help_orders::handlers::router(help_orders))
}

/// `/ready` and `/metrics`, mounted at the root next to `/health`.
pub fn ops_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .route("/metrics", get(health::metrics_handler))
        .with_state(state)
}
