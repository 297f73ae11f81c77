//! Queue handlers that turn mail jobs into sent messages.

use crate::job::{ANSWER_MAIL, AnswerMail, ENROLLMENT_MAIL, EnrollmentMail, MailJob, MailPayload};
use crate::models::Email;
use crate::provider::{EmailProvider, SendResult};
use crate::templates::TemplateEngine;
use async_trait::async_trait;
use job_queue::{ProcessorRegistry, StreamError, StreamProcessor};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Renders a template and hands the result to the mail sink.
#[derive(Clone)]
pub struct Mailer {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    sender: String,
}

impl Mailer {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        templates: TemplateEngine,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            templates: Arc::new(templates),
            sender: sender.into(),
        }
    }

    /// A template that fails to render is permanent: retrying renders the
    /// same snapshot again.
    pub async fn deliver(
        &self,
        to: String,
        template: &str,
        context: &Value,
    ) -> Result<SendResult, StreamError> {
        let rendered = self
            .templates
            .render(template, context)
            .map_err(|e| StreamError::permanent(format!("Template error: {}", e)))?;

        let mut email = Email::new(to, rendered.subject)
            .with_from(self.sender.clone())
            .with_template(template);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;

        self.provider
            .send(&email)
            .await
            .map_err(|e| classify_send_error(&format!("{:#}", e)))
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(self.provider.health_check().await.is_ok())
    }
}

/// Maps a provider failure onto a retry category.
fn classify_send_error(message: &str) -> StreamError {
    let lower = message.to_lowercase();
    if lower.contains("rate limit") || lower.contains("429") || lower.contains("too many") {
        StreamError::rate_limited(message)
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("must have")
    {
        StreamError::permanent(message)
    } else {
        StreamError::transient(message)
    }
}

fn unexpected_payload(handler: &str, job: &MailJob) -> StreamError {
    StreamError::permanent(format!("{} cannot handle {} jobs", handler, job.payload.kind()))
}

/// Sends the enrollment confirmation.
pub struct EnrollmentMailHandler {
    mailer: Mailer,
}

impl EnrollmentMailHandler {
    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }

    fn context(mail: &EnrollmentMail) -> Value {
        json!({
            "name": mail.student.name,
            "plan_title": mail.plan_title,
            "plan_duration": mail.plan_duration,
            "start_date": mail.start_date.format("%Y-%m-%d").to_string(),
            "end_date": mail.end_date.format("%Y-%m-%d").to_string(),
            "price": format!("{:.2}", mail.price),
        })
    }
}

#[async_trait]
impl StreamProcessor<MailJob> for EnrollmentMailHandler {
    async fn process(&self, job: &MailJob) -> Result<(), StreamError> {
        let MailPayload::EnrollmentMail(mail) = &job.payload else {
            return Err(unexpected_payload("EnrollmentMailHandler", job));
        };

        let result = self
            .mailer
            .deliver(mail.student.mailbox(), "enrollment", &Self::context(mail))
            .await?;

        info!(
            job_id = %job.id,
            enrollment_id = mail.enrollment_id,
            message_id = %result.message_id,
            "Enrollment mail sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "enrollment_mail"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        self.mailer.health_check().await
    }
}

/// Sends the answer to a help order.
pub struct AnswerMailHandler {
    mailer: Mailer,
}

impl AnswerMailHandler {
    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }

    fn context(mail: &AnswerMail) -> Value {
        json!({
            "name": mail.student.name,
            "question": mail.question,
            "answer": mail.answer,
        })
    }
}

#[async_trait]
impl StreamProcessor<MailJob> for AnswerMailHandler {
    async fn process(&self, job: &MailJob) -> Result<(), StreamError> {
        let MailPayload::AnswerMail(mail) = &job.payload else {
            return Err(unexpected_payload("AnswerMailHandler", job));
        };

        let result = self
            .mailer
            .deliver(mail.student.mailbox(), "answer", &Self::context(mail))
            .await?;

        info!(
            job_id = %job.id,
            help_order_id = mail.help_order_id,
            message_id = %result.message_id,
            "Answer mail sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "answer_mail"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        self.mailer.health_check().await
    }
}

/// Registry with one handler per mail kind.
pub fn mail_registry(mailer: Mailer) -> ProcessorRegistry<MailJob> {
    let mut registry = ProcessorRegistry::new();
    registry
        .register(ENROLLMENT_MAIL, EnrollmentMailHandler::new(mailer.clone()))
        .register(ANSWER_MAIL, AnswerMailHandler::new(mailer));
    registry
}
