use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StudentError, StudentResult};
use crate::models::{CreateStudent, PAGE_SIZE, Student, UpdateStudent};

/// Repository trait for Student persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create(&self, input: CreateStudent) -> StudentResult<Student>;

    async fn get_by_id(&self, id: i32) -> StudentResult<Option<Student>>;

    async fn find_by_email(&self, email: &str) -> StudentResult<Option<Student>>;

    /// One page (1-based) of students whose name contains `name`, ignoring
    /// case, ordered by name. Returns the page and the total match count.
    async fn search(&self, name: &str, page: u64) -> StudentResult<(Vec<Student>, u64)>;

    /// Fails with `InvalidId` for an unknown id and `EmailTaken` when the new
    /// email belongs to another student.
    async fn update(&self, id: i32, input: UpdateStudent) -> StudentResult<Student>;

    async fn delete(&self, id: i32) -> StudentResult<bool>;
}

/// In-memory implementation of StudentRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryStudentRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    students: BTreeMap<i32, Student>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn create(&self, input: CreateStudent) -> StudentResult<Student> {
        let mut state = self.state.write().await;

        if state.students.values().any(|s| s.email == input.email) {
            return Err(StudentError::AlreadyExists);
        }

        state.next_id += 1;
        let now = Utc::now();
        let student = Student {
            id: state.next_id,
            name: input.name,
            email: input.email,
            age: input.age,
            weight: input.weight,
            height: input.height,
            created_at: now,
            updated_at: now,
        };
        state.students.insert(student.id, student.clone());

        tracing::info!(student_id = %student.id, "Created student");
        Ok(student)
    }

    async fn get_by_id(&self, id: i32) -> StudentResult<Option<Student>> {
        Ok(self.state.read().await.students.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StudentResult<Option<Student>> {
        let state = self.state.read().await;
        Ok(state.students.values().find(|s| s.email == email).cloned())
    }

    async fn search(&self, name: &str, page: u64) -> StudentResult<(Vec<Student>, u64)> {
        let state = self.state.read().await;
        let needle = name.to_lowercase();

        let mut matches: Vec<Student> = state
            .students
            .values()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matches.len() as u64;
        let rows = matches
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .collect();
        Ok((rows, total))
    }

    async fn update(&self, id: i32, input: UpdateStudent) -> StudentResult<Student> {
        let mut state = self.state.write().await;

        if !state.students.contains_key(&id) {
            return Err(StudentError::InvalidId);
        }

        if let Some(ref email) = input.email {
            if state.students.values().any(|s| s.id != id && &s.email == email) {
                return Err(StudentError::EmailTaken);
            }
        }

        let student = state
            .students
            .get_mut(&id)
            .ok_or(StudentError::InvalidId)?;
        student.apply_update(input);
        let updated = student.clone();

        tracing::info!(student_id = %id, "Updated student");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> StudentResult<bool> {
        let removed = self.state.write().await.students.remove(&id).is_some();
        if removed {
            tracing::info!(student_id = %id, "Deleted student");
        }
        Ok(removed)
    }
}
