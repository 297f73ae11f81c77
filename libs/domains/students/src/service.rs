use std::sync::Arc;
use validator::Validate;

use crate::error::{StudentError, StudentResult};
use crate::models::{
    CreateStudent, PAGE_SIZE, RemovedResponse, Student, StudentPage, StudentSearch, UpdateStudent,
};
use crate::repository::StudentRepository;

/// Service layer for student registration
#[derive(Clone)]
pub struct StudentService<R: StudentRepository> {
    repository: Arc<R>,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Shared handle to the repository, for domains that look students up.
    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    /// Register a student. The email must not belong to anyone else.
    pub async fn create_student(&self, input: CreateStudent) -> StudentResult<Student> {
        input
            .validate()
            .map_err(|e| StudentError::Validation(e.to_string()))?;

        if self.repository.find_by_email(&input.email).await?.is_some() {
            return Err(StudentError::AlreadyExists);
        }

        self.repository.create(input).await
    }

    pub async fn get_student(&self, id: i32) -> StudentResult<Student> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(StudentError::InvalidId)
    }

    pub async fn search_students(&self, search: StudentSearch) -> StudentResult<StudentPage> {
        let page = search.page();
        let name = search.name.unwrap_or_default();

        let (students, total) = self.repository.search(&name, page).await?;

        Ok(StudentPage {
            students,
            page,
            last_page: total.div_ceil(PAGE_SIZE),
        })
    }

    pub async fn update_student(&self, id: i32, input: UpdateStudent) -> StudentResult<Student> {
        input
            .validate()
            .map_err(|e| StudentError::Validation(e.to_string()))?;

        let current = self.get_student(id).await?;

        if let Some(ref email) = input.email {
            if email != &current.email {
                if let Some(other) = self.repository.find_by_email(email).await? {
                    if other.id != id {
                        return Err(StudentError::EmailTaken);
                    }
                }
            }
        }

        self.repository.update(id, input).await
    }

    pub async fn delete_student(&self, id: i32) -> StudentResult<RemovedResponse> {
        if !self.repository.delete(id).await? {
            return Err(StudentError::NotFound);
        }

        Ok(RemovedResponse {
            msg: "The student was successfully removed".to_string(),
        })
    }
}
