//! Mail notifications for the gym backend
//!
//! Services never send mail themselves. They enqueue a [`MailJob`] carrying
//! a snapshot of everything the message needs, and a worker later runs the
//! handler registered for the job's kind.
//!
//! ## Components
//!
//! - **Jobs**: [`MailJob`], [`MailPayload`] ([`EnrollmentMail`], [`AnswerMail`]), [`MailStream`]
//! - **Handlers**: [`EnrollmentMailHandler`], [`AnswerMailHandler`], [`mail_registry`]
//! - **Templates**: Handlebars-based [`TemplateEngine`] with the `enrollment`
//!   and `answer` templates
//! - **Providers**: [`SmtpProvider`] (lettre), [`LogEmailProvider`] for
//!   development, [`MockEmailProvider`] for tests
//!
//! ## Usage
//!
//! ```ignore
//! use email::{mail_registry, MailConfig, Mailer, TemplateEngine};
//! use job_queue::InMemoryQueue;
//!
//! let config = MailConfig::from_env()?;
//! let mailer = Mailer::new(config.build_provider()?, TemplateEngine::new()?, config.sender());
//!
//! let (queue, receiver) = InMemoryQueue::channel("mail");
//! tokio::spawn(receiver.into_worker(mail_registry(mailer)).run(shutdown_rx));
//! ```

pub mod config;
pub mod handlers;
pub mod job;
pub mod models;
pub mod provider;
pub mod templates;

pub use config::{MailConfig, SmtpConfig};
pub use handlers::{AnswerMailHandler, EnrollmentMailHandler, Mailer, mail_registry};
pub use job::{
    ANSWER_MAIL, AnswerMail, ENROLLMENT_MAIL, EnrollmentMail, MailJob, MailPayload, MailRecipient,
    MailStream,
};
pub use models::Email;
pub use provider::{EmailProvider, LogEmailProvider, MockEmailProvider, SendResult, SmtpProvider};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
