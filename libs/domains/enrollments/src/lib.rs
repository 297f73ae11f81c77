//! Enrollments Domain
//!
//! Binds a student to a plan for a period. The end date and the total price
//! are derived from the plan when the enrollment is written; `active` is
//! derived from the dates every time the enrollment is read.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /enrollments routes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← student/plan lookups, date and price rules,
//! └──────┬──────┘    EnrollmentMail on create
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← in-memory or PostgreSQL
//! └─────────────┘
//! ```
//!
//! # Rules
//!
//! - one enrollment row per student, canceled or not
//! - `end_date = start_date + duration months`, clamped to the month end
//! - `price = monthly price × duration`
//! - the start date may not lie in the past
//! - cancellation stamps `canceled_at` once and never clears it

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{EnrollmentError, EnrollmentResult};
pub use models::{
    CreateEnrollment, Enrollment, EnrollmentDetails, EnrollmentTerms, NewEnrollment, PlanSummary,
    StudentSummary, UpdateEnrollment,
};
pub use postgres::PgEnrollmentRepository;
pub use repository::{EnrollmentRepository, InMemoryEnrollmentRepository};
pub use service::EnrollmentService;
