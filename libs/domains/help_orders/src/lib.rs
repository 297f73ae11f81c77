//! Help Orders Domain
//!
//! Questions a student sends to the gym staff, and their single answer.
//! Answering stamps `answered_at` and queues an `AnswerMail` to the student.
//!
//! ```text
//! POST /students/{id}/help-orders   submit a question
//! GET  /students/{id}/help-orders   a student's questions
//! GET  /help-orders                 the unanswered queue
//! POST /help-orders/{id}/answer     answer once
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{HelpOrderError, HelpOrderResult};
pub use models::{AnswerQuestion, HelpOrder, SubmitQuestion};
pub use postgres::PgHelpOrderRepository;
pub use repository::{HelpOrderRepository, InMemoryHelpOrderRepository};
pub use service::HelpOrderService;
