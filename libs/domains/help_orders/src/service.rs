use chrono::Utc;
use domain_students::{Student, StudentRepository};
use email::{AnswerMail, MailJob, MailRecipient};
use job_queue::JobProducer;
use std::sync::Arc;
use validator::Validate;

use crate::error::{HelpOrderError, HelpOrderResult};
use crate::models::{AnswerQuestion, HelpOrder, SubmitQuestion};
use crate::repository::HelpOrderRepository;

/// Help desk: students ask, staff answer once.
#[derive(Clone)]
pub struct HelpOrderService<R: HelpOrderRepository> {
    repository: Arc<R>,
    students: Arc<dyn StudentRepository>,
    mail: Arc<dyn JobProducer<MailJob>>,
}

impl<R: HelpOrderRepository> HelpOrderService<R> {
    pub fn new(
        repository: R,
        students: Arc<dyn StudentRepository>,
        mail: Arc<dyn JobProducer<MailJob>>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            students,
            mail,
        }
    }

    pub async fn submit_question(
        &self,
        student_id: i32,
        input: SubmitQuestion,
    ) -> HelpOrderResult<HelpOrder> {
        input
            .validate()
            .map_err(|e| HelpOrderError::Validation(e.to_string()))?;

        self.students
            .get_by_id(student_id)
            .await?
            .ok_or(HelpOrderError::InvalidStudentId)?;

        self.repository.create(student_id, input.question).await
    }

    /// Record the answer and queue an `AnswerMail` to the student.
    ///
    /// The repository decides the single winner when two answers race; the
    /// loser gets `AlreadyAnswered` and no mail is queued for it.
    pub async fn answer(&self, id: i32, input: AnswerQuestion) -> HelpOrderResult<HelpOrder> {
        input
            .validate()
            .map_err(|e| HelpOrderError::Validation(e.to_string()))?;

        let help_order = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(HelpOrderError::NotFound)?;

        if help_order.is_answered() {
            return Err(HelpOrderError::AlreadyAnswered);
        }

        let student = self.students.get_by_id(help_order.student_id).await?;

        let answered = self
            .repository
            .answer(id, input.answer, Utc::now())
            .await?;

        match student {
            Some(student) => self.notify(&answered, &student).await,
            None => {
                tracing::warn!(help_order_id = %id, student_id = %answered.student_id, "Student missing, answer mail skipped")
            }
        }

        Ok(answered)
    }

    pub async fn list_unanswered(&self) -> HelpOrderResult<Vec<HelpOrder>> {
        self.repository.list_unanswered().await
    }

    /// Unknown students simply have no help orders.
    pub async fn list_by_student(&self, student_id: i32) -> HelpOrderResult<Vec<HelpOrder>> {
        self.repository.list_by_student(student_id).await
    }

    async fn notify(&self, help_order: &HelpOrder, student: &Student) {
        let (Some(answer), Some(answered_at)) = (&help_order.answer, help_order.answered_at) else {
            return;
        };

        let job = MailJob::answer(AnswerMail {
            help_order_id: help_order.id,
            student: MailRecipient::new(&student.name, &student.email),
            question: help_order.question.clone(),
            answer: answer.clone(),
            answered_at,
        });
        let job_id = job.id;

        match self.mail.enqueue(job).await {
            Ok(receipt) => {
                tracing::info!(help_order_id = %help_order.id, %job_id, %receipt, "Enqueued answer mail")
            }
            Err(e) => {
                tracing::error!(help_order_id = %help_order.id, %job_id, error = %e, "Failed to enqueue answer mail")
            }
        }
    }
}
