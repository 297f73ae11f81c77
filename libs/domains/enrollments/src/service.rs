use chrono::Utc;
use domain_plans::{Plan, PlanRepository};
use domain_students::{Student, StudentRepository};
use email::{EnrollmentMail, MailJob, MailRecipient};
use job_queue::JobProducer;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::error::{EnrollmentError, EnrollmentResult};
use crate::models::{
    CreateEnrollment, Enrollment, EnrollmentDetails, EnrollmentTerms, NewEnrollment, PlanSummary,
    StudentSummary, UpdateEnrollment, today,
};
use crate::repository::EnrollmentRepository;

/// Enrollment lifecycle: create, update, cancel and the read projections.
///
/// Students and plans are only looked up, never written.
#[derive(Clone)]
pub struct EnrollmentService<R: EnrollmentRepository> {
    repository: Arc<R>,
    students: Arc<dyn StudentRepository>,
    plans: Arc<dyn PlanRepository>,
    mail: Arc<dyn JobProducer<MailJob>>,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    pub fn new(
        repository: R,
        students: Arc<dyn StudentRepository>,
        plans: Arc<dyn PlanRepository>,
        mail: Arc<dyn JobProducer<MailJob>>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            students,
            plans,
            mail,
        }
    }

    /// Enroll a student in a plan starting on `start_date`.
    ///
    /// Checks run in a fixed order (student, existing enrollment, plan,
    /// date) and all of them before anything is written. The confirmation
    /// mail is enqueued after the row is stored; a queue failure is logged
    /// and does not fail the enrollment.
    pub async fn create_enrollment(&self, input: CreateEnrollment) -> EnrollmentResult<Enrollment> {
        input
            .validate()
            .map_err(|e| EnrollmentError::Validation(e.to_string()))?;

        let student = self
            .students
            .get_by_id(input.student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound)?;

        if self
            .repository
            .find_by_student(input.student_id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let plan = self
            .plans
            .get_by_id(input.plan_id)
            .await?
            .ok_or(EnrollmentError::PlanNotFound)?;

        let terms = Self::terms(input.start_date, &plan)?;
        let enrollment = self
            .repository
            .create(NewEnrollment::new(
                student.id,
                plan.id,
                input.start_date,
                terms,
            ))
            .await?;

        self.notify(&enrollment, &student, &plan).await;

        Ok(enrollment)
    }

    /// Move an enrollment to another student, plan or start date. End date
    /// and price are recomputed from the plan; no mail is sent.
    pub async fn update_enrollment(
        &self,
        id: i32,
        input: UpdateEnrollment,
    ) -> EnrollmentResult<Enrollment> {
        input
            .validate()
            .map_err(|e| EnrollmentError::Validation(e.to_string()))?;

        let current = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;

        let plan = self
            .plans
            .get_by_id(input.plan_id)
            .await?
            .ok_or(EnrollmentError::PlanNotFound)?;

        let student = self
            .students
            .get_by_id(input.student_id)
            .await?
            .ok_or(EnrollmentError::InvalidStudentId)?;

        let terms = Self::terms(input.start_date, &plan)?;

        if student.id != current.student_id {
            if let Some(other) = self.repository.find_by_student(student.id).await? {
                if other.id != id {
                    return Err(EnrollmentError::AlreadyEnrolled);
                }
            }
        }

        self.repository
            .update(
                id,
                NewEnrollment::new(student.id, plan.id, input.start_date, terms),
            )
            .await
    }

    /// Soft delete. Canceling twice keeps the first timestamp.
    pub async fn cancel_enrollment(&self, id: i32) -> EnrollmentResult<Enrollment> {
        self.repository
            .cancel(id, Utc::now())
            .await?
            .ok_or(EnrollmentError::InvalidId)
    }

    pub async fn get_enrollment(&self, id: i32) -> EnrollmentResult<EnrollmentDetails> {
        let enrollment = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;

        let student = self.students.get_by_id(enrollment.student_id).await?;
        let plan = self.plans.get_by_id(enrollment.plan_id).await?;

        Ok(EnrollmentDetails::new(
            &enrollment,
            student.map(student_summary),
            plan.map(plan_summary),
        ))
    }

    /// Every enrollment, ordered by id, with its student and plan.
    pub async fn list_enrollments(&self) -> EnrollmentResult<Vec<EnrollmentDetails>> {
        let enrollments = self.repository.list().await?;

        let mut students: HashMap<i32, Option<StudentSummary>> = HashMap::new();
        let mut plans: HashMap<i32, Option<PlanSummary>> = HashMap::new();
        let mut details = Vec::with_capacity(enrollments.len());

        for enrollment in &enrollments {
            if !students.contains_key(&enrollment.student_id) {
                let student = self.students.get_by_id(enrollment.student_id).await?;
                students.insert(enrollment.student_id, student.map(student_summary));
            }
            if !plans.contains_key(&enrollment.plan_id) {
                let plan = self.plans.get_by_id(enrollment.plan_id).await?;
                plans.insert(enrollment.plan_id, plan.map(plan_summary));
            }

            details.push(EnrollmentDetails::new(
                enrollment,
                students.get(&enrollment.student_id).cloned().flatten(),
                plans.get(&enrollment.plan_id).cloned().flatten(),
            ));
        }

        Ok(details)
    }

    fn terms(start_date: chrono::NaiveDate, plan: &Plan) -> EnrollmentResult<EnrollmentTerms> {
        if start_date < today() {
            return Err(EnrollmentError::InvalidDate);
        }
        EnrollmentTerms::for_plan(start_date, plan).ok_or(EnrollmentError::InvalidDate)
    }

    async fn notify(&self, enrollment: &Enrollment, student: &Student, plan: &Plan) {
        let job = MailJob::enrollment(EnrollmentMail {
            enrollment_id: enrollment.id,
            student: MailRecipient::new(&student.name, &student.email),
            plan_title: plan.title.clone(),
            plan_duration: plan.duration,
            start_date: enrollment.start_date,
            end_date: enrollment.end_date,
            price: enrollment.price,
        });
        let job_id = job.id;

        match self.mail.enqueue(job).await {
            Ok(receipt) => {
                tracing::info!(enrollment_id = %enrollment.id, %job_id, %receipt, "Enqueued enrollment mail")
            }
            Err(e) => {
                tracing::error!(enrollment_id = %enrollment.id, %job_id, error = %e, "Failed to enqueue enrollment mail")
            }
        }
    }
}

fn student_summary(student: Student) -> StudentSummary {
    StudentSummary {
        id: student.id,
        name: student.name,
    }
}

fn plan_summary(plan: Plan) -> PlanSummary {
    PlanSummary {
        id: plan.id,
        title: plan.title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryEnrollmentRepository, MockEnrollmentRepository};
    use chrono::{Days, NaiveDate};
    use domain_plans::{CreatePlan, InMemoryPlanRepository};
    use domain_students::{CreateStudent, InMemoryStudentRepository};
    use email::MailPayload;
    use job_queue::{InMemoryQueue, InMemoryReceiver};

    struct Fixture {
        students: Arc<InMemoryStudentRepository>,
        plans: Arc<InMemoryPlanRepository>,
        queue: Arc<InMemoryQueue<MailJob>>,
        mail: InMemoryReceiver<MailJob>,
    }

    impl Fixture {
        fn new() -> Self {
            let (queue, mail) = InMemoryQueue::channel("mail");
            Self {
                students: Arc::new(InMemoryStudentRepository::new()),
                plans: Arc::new(InMemoryPlanRepository::new()),
                queue: Arc::new(queue),
                mail,
            }
        }

        fn service<R: EnrollmentRepository>(&self, repository: R) -> EnrollmentService<R> {
            EnrollmentService::new(
                repository,
                self.students.clone(),
                self.plans.clone(),
                self.queue.clone(),
            )
        }

        async fn student(&self, name: &str) -> Student {
            self.students
                .create(CreateStudent {
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    age: 30,
                    weight: 70.0,
                    height: 1.75,
                })
                .await
                .unwrap()
        }

        async fn plan(&self, title: &str, duration: i32, price: f64) -> Plan {
            self.plans
                .create(CreatePlan {
                    title: title.to_string(),
                    duration,
                    price,
                })
                .await
                .unwrap()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn yesterday() -> NaiveDate {
        today().checked_sub_days(Days::new(1)).unwrap()
    }

    #[tokio::test]
    async fn test_create_derives_terms_and_enqueues_mail() {
        let mut fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let enrollment = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await
            .unwrap();

        assert_eq!(enrollment.end_date, date(2030, 4, 10));
        assert_eq!(enrollment.price, 300.0);
        assert!(enrollment.canceled_at.is_none());

        let job = fx.mail.try_recv().expect("EnrollmentMail enqueued");
        let MailPayload::EnrollmentMail(mail) = job.payload else {
            panic!("expected an EnrollmentMail payload");
        };
        assert_eq!(mail.enrollment_id, enrollment.id);
        assert_eq!(mail.student.name, "Ana");
        assert_eq!(mail.student.email, "ana@example.com");
        assert_eq!(mail.plan_title, "Gold");
        assert_eq!(mail.plan_duration, 3);
        assert!(fx.mail.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_create_today_is_valid_and_active() {
        let fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let start = fx.plan("Start", 1, 129.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let enrollment = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: start.id,
                start_date: today(),
            })
            .await
            .unwrap();

        assert!(enrollment.active);
    }

    #[tokio::test]
    async fn test_create_checks_in_order() {
        let fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let unknown_student = service
            .create_enrollment(CreateEnrollment {
                student_id: 999,
                plan_id: 999,
                start_date: yesterday(),
            })
            .await;
        assert!(matches!(unknown_student, Err(EnrollmentError::StudentNotFound)));

        let unknown_plan = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: 999,
                start_date: yesterday(),
            })
            .await;
        assert!(matches!(unknown_plan, Err(EnrollmentError::PlanNotFound)));

        let past = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: yesterday(),
            })
            .await;
        assert!(matches!(past, Err(EnrollmentError::InvalidDate)));

        service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await
            .unwrap();

        let twice = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: 999,
                start_date: yesterday(),
            })
            .await;
        assert!(matches!(twice, Err(EnrollmentError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_create_rejected_by_check_writes_nothing() {
        let mut fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let gold = fx.plan("Gold", 3, 100.0).await;

        let mut mock_repo = MockEnrollmentRepository::new();
        mock_repo.expect_find_by_student().returning(|_| Ok(None));
        mock_repo.expect_create().times(0);
        let service = fx.service(mock_repo);

        let result = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: yesterday(),
            })
            .await;

        assert!(matches!(result, Err(EnrollmentError::InvalidDate)));
        assert!(fx.mail.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_create_survives_closed_queue() {
        let Fixture {
            students,
            plans,
            queue,
            mail,
        } = Fixture::new();
        drop(mail);

        let ana = students
            .create(CreateStudent {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                age: 30,
                weight: 70.0,
                height: 1.75,
            })
            .await
            .unwrap();
        let gold = plans
            .create(CreatePlan {
                title: "Gold".into(),
                duration: 3,
                price: 100.0,
            })
            .await
            .unwrap();

        let service =
            EnrollmentService::new(InMemoryEnrollmentRepository::new(), students, plans, queue);
        let result = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_recomputes_terms_without_mail() {
        let mut fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let diamond = fx.plan("Diamond", 6, 90.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let enrollment = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await
            .unwrap();
        fx.mail.try_recv().unwrap();

        let updated = service
            .update_enrollment(
                enrollment.id,
                UpdateEnrollment {
                    student_id: ana.id,
                    plan_id: diamond.id,
                    start_date: date(2030, 2, 1),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.plan_id, diamond.id);
        assert_eq!(updated.end_date, date(2030, 8, 1));
        assert_eq!(updated.price, 540.0);
        assert!(fx.mail.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_update_errors() {
        let fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let bruno = fx.student("Bruno").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let ana_enrollment = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await
            .unwrap();
        service
            .create_enrollment(CreateEnrollment {
                student_id: bruno.id,
                plan_id: gold.id,
                start_date: date(2030, 1, 10),
            })
            .await
            .unwrap();

        let update = |student_id, plan_id, start_date| UpdateEnrollment {
            student_id,
            plan_id,
            start_date,
        };

        let missing = service
            .update_enrollment(999, update(ana.id, gold.id, date(2030, 1, 10)))
            .await;
        assert!(matches!(missing, Err(EnrollmentError::NotFound)));

        let no_plan = service
            .update_enrollment(ana_enrollment.id, update(999, 999, yesterday()))
            .await;
        assert!(matches!(no_plan, Err(EnrollmentError::PlanNotFound)));

        let no_student = service
            .update_enrollment(ana_enrollment.id, update(999, gold.id, yesterday()))
            .await;
        assert!(matches!(no_student, Err(EnrollmentError::InvalidStudentId)));

        let past = service
            .update_enrollment(ana_enrollment.id, update(ana.id, gold.id, yesterday()))
            .await;
        assert!(matches!(past, Err(EnrollmentError::InvalidDate)));

        let taken = service
            .update_enrollment(ana_enrollment.id, update(bruno.id, gold.id, date(2030, 1, 10)))
            .await;
        assert!(matches!(taken, Err(EnrollmentError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_cancel() {
        let fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        let enrollment = service
            .create_enrollment(CreateEnrollment {
                student_id: ana.id,
                plan_id: gold.id,
                start_date: today(),
            })
            .await
            .unwrap();

        let canceled = service.cancel_enrollment(enrollment.id).await.unwrap();
        let stamp = canceled.canceled_at.expect("canceled_at set");
        assert!(!canceled.active);

        let again = service.cancel_enrollment(enrollment.id).await.unwrap();
        assert_eq!(again.canceled_at, Some(stamp));

        let unknown = service.cancel_enrollment(999).await;
        assert!(matches!(unknown, Err(EnrollmentError::InvalidId)));
    }

    #[tokio::test]
    async fn test_projections_are_stable_and_nested() {
        let fx = Fixture::new();
        let ana = fx.student("Ana").await;
        let bruno = fx.student("Bruno").await;
        let gold = fx.plan("Gold", 3, 100.0).await;
        let service = fx.service(InMemoryEnrollmentRepository::new());

        for student in [&ana, &bruno] {
            service
                .create_enrollment(CreateEnrollment {
                    student_id: student.id,
                    plan_id: gold.id,
                    start_date: date(2030, 1, 10),
                })
                .await
                .unwrap();
        }

        let first = service.list_enrollments().await.unwrap();
        let second = service.list_enrollments().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            first[0].student,
            Some(StudentSummary {
                id: ana.id,
                name: "Ana".into()
            })
        );
        assert_eq!(
            first[1].plan,
            Some(PlanSummary {
                id: gold.id,
                title: "Gold".into()
            })
        );

        let index = service.get_enrollment(first[1].id).await.unwrap();
        assert_eq!(index, first[1]);
        assert_eq!(index.student.unwrap().name, "Bruno");

        let missing = service.get_enrollment(999).await;
        assert!(matches!(missing, Err(EnrollmentError::NotFound)));
    }
}
