//! Mail jobs and their payload snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use job_queue::{StreamDef, StreamJob};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of the job sent after an enrollment is created.
pub const ENROLLMENT_MAIL: &str = "EnrollmentMail";
/// Kind of the job sent after a help order is answered.
pub const ANSWER_MAIL: &str = "AnswerMail";

/// Redis keys for mail jobs.
pub struct MailStream;

impl StreamDef for MailStream {
    const STREAM_NAME: &'static str = "mail:jobs";
    const CONSUMER_GROUP: &'static str = "mail_workers";
    const DLQ_STREAM: &'static str = "mail:dlq";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailRecipient {
    pub name: String,
    pub email: String,
}

impl MailRecipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// `Name <email>`
    pub fn mailbox(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// Enrollment as it was when the job was enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentMail {
    pub enrollment_id: i32,
    pub student: MailRecipient,
    pub plan_title: String,
    /// Months
    pub plan_duration: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Total price of the enrollment
    pub price: f64,
}

/// Answered help order as it was when the job was enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerMail {
    pub help_order_id: i32,
    pub student: MailRecipient,
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MailPayload {
    EnrollmentMail(EnrollmentMail),
    AnswerMail(AnswerMail),
}

impl MailPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            MailPayload::EnrollmentMail(_) => ENROLLMENT_MAIL,
            MailPayload::AnswerMail(_) => ANSWER_MAIL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailJob {
    pub id: Uuid,
    pub payload: MailPayload,
    #[serde(default)]
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

impl MailJob {
    pub fn new(payload: MailPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            payload,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn enrollment(mail: EnrollmentMail) -> Self {
        Self::new(MailPayload::EnrollmentMail(mail))
    }

    pub fn answer(mail: AnswerMail) -> Self {
        Self::new(MailPayload::AnswerMail(mail))
    }
}

impl StreamJob for MailJob {
    fn job_id(&self) -> String {
        self.id.to_string()
    }

    fn kind(&self) -> &str {
        self.payload.kind()
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    fn with_retry(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }
}
