//! Plans Domain
//!
//! Subscription plans: a title, a duration in months and a monthly price.
//! Enrollments read a plan's duration and price once, when they are created
//! or updated, and never again.
//!
//! ```rust,no_run
//! use domain_plans::{handlers, InMemoryPlanRepository, PlanService};
//!
//! let service = PlanService::new(InMemoryPlanRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{PlanError, PlanResult};
pub use models::{CreatePlan, PAGE_SIZE, Plan, PlanPage, PlanSearch, RemovedResponse, UpdatePlan};
pub use postgres::PgPlanRepository;
pub use repository::{InMemoryPlanRepository, PlanRepository};
pub use service::PlanService;
