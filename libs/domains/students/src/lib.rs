//! Students Domain
//!
//! Registration data for the gym's students. Other domains only ever look a
//! student up by id, through [`StudentRepository`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /students routes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← validation, uniqueness rules
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← in-memory or PostgreSQL
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_students::{handlers, InMemoryStudentRepository, StudentService};
//!
//! let service = StudentService::new(InMemoryStudentRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{StudentError, StudentResult};
pub use models::{
    CreateStudent, PAGE_SIZE, RemovedResponse, Student, StudentPage, StudentSearch, UpdateStudent,
};
pub use postgres::PgStudentRepository;
pub use repository::{InMemoryStudentRepository, StudentRepository};
pub use service::StudentService;
