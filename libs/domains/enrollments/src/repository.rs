use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{EnrollmentError, EnrollmentResult};
use crate::models::{Enrollment, NewEnrollment};

/// Repository trait for Enrollment persistence
///
/// Implementations return enrollments with `active` computed for today.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fails with `AlreadyEnrolled` when the student already has a row.
    async fn create(&self, input: NewEnrollment) -> EnrollmentResult<Enrollment>;

    async fn get_by_id(&self, id: i32) -> EnrollmentResult<Option<Enrollment>>;

    /// The student's enrollment, canceled or not.
    async fn find_by_student(&self, student_id: i32) -> EnrollmentResult<Option<Enrollment>>;

    /// All enrollments ordered by id.
    async fn list(&self) -> EnrollmentResult<Vec<Enrollment>>;

    /// Fails with `NotFound` for an unknown id and `AlreadyEnrolled` when
    /// the new student has another enrollment.
    async fn update(&self, id: i32, input: NewEnrollment) -> EnrollmentResult<Enrollment>;

    /// Stamps `canceled_at` unless already set. `None` for an unknown id.
    async fn cancel(&self, id: i32, at: DateTime<Utc>) -> EnrollmentResult<Option<Enrollment>>;
}

/// In-memory implementation of EnrollmentRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEnrollmentRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    enrollments: BTreeMap<i32, Enrollment>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn create(&self, input: NewEnrollment) -> EnrollmentResult<Enrollment> {
        // Check and insert under one write lock
        let mut state = self.state.write().await;

        if state
            .enrollments
            .values()
            .any(|e| e.student_id == input.student_id)
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        state.next_id += 1;
        let now = Utc::now();
        let enrollment = Enrollment {
            id: state.next_id,
            student_id: input.student_id,
            plan_id: input.plan_id,
            start_date: input.start_date,
            end_date: input.end_date,
            price: input.price,
            active: false,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        };
        state.enrollments.insert(enrollment.id, enrollment.clone());

        tracing::info!(enrollment_id = %enrollment.id, student_id = %enrollment.student_id, "Created enrollment");
        Ok(enrollment.refreshed())
    }

    async fn get_by_id(&self, id: i32) -> EnrollmentResult<Option<Enrollment>> {
        let state = self.state.read().await;
        Ok(state.enrollments.get(&id).cloned().map(Enrollment::refreshed))
    }

    async fn find_by_student(&self, student_id: i32) -> EnrollmentResult<Option<Enrollment>> {
        let state = self.state.read().await;
        Ok(state
            .enrollments
            .values()
            .find(|e| e.student_id == student_id)
            .cloned()
            .map(Enrollment::refreshed))
    }

    async fn list(&self) -> EnrollmentResult<Vec<Enrollment>> {
        let state = self.state.read().await;
        Ok(state
            .enrollments
            .values()
            .cloned()
            .map(Enrollment::refreshed)
            .collect())
    }

    async fn update(&self, id: i32, input: NewEnrollment) -> EnrollmentResult<Enrollment> {
        let mut state = self.state.write().await;

        if state
            .enrollments
            .values()
            .any(|e| e.id != id && e.student_id == input.student_id)
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrollment = state
            .enrollments
            .get_mut(&id)
            .ok_or(EnrollmentError::NotFound)?;
        enrollment.student_id = input.student_id;
        enrollment.plan_id = input.plan_id;
        enrollment.start_date = input.start_date;
        enrollment.end_date = input.end_date;
        enrollment.price = input.price;
        enrollment.updated_at = Utc::now();
        let updated = enrollment.clone();

        tracing::info!(enrollment_id = %id, "Updated enrollment");
        Ok(updated.refreshed())
    }

    async fn cancel(&self, id: i32, at: DateTime<Utc>) -> EnrollmentResult<Option<Enrollment>> {
        let mut state = self.state.write().await;

        let Some(enrollment) = state.enrollments.get_mut(&id) else {
            return Ok(None);
        };

        if enrollment.canceled_at.is_none() {
            enrollment.canceled_at = Some(at);
            enrollment.updated_at = at;
            tracing::info!(enrollment_id = %id, "Canceled enrollment");
        }

        Ok(Some(enrollment.clone().refreshed()))
    }
}
