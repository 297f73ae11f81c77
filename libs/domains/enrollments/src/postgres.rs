use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    entity,
    error::{EnrollmentError, EnrollmentResult, db_error},
    models::{Enrollment, NewEnrollment},
    repository::EnrollmentRepository,
};

#[derive(Clone)]
pub struct PgEnrollmentRepository {
    db: DatabaseConnection,
}

impl PgEnrollmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `enrollments.student_id` is UNIQUE, so a violation always means the
/// student already has an enrollment.
fn write_error(e: DbErr) -> EnrollmentError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EnrollmentError::AlreadyEnrolled,
        _ => db_error(e),
    }
}

#[async_trait]
impl EnrollmentRepository for PgEnrollmentRepository {
    async fn create(&self, input: NewEnrollment) -> EnrollmentResult<Enrollment> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await.map_err(write_error)?;

        tracing::info!(enrollment_id = %model.id, student_id = %model.student_id, "Created enrollment");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> EnrollmentResult<Option<Enrollment>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_student(&self, student_id: i32) -> EnrollmentResult<Option<Enrollment>> {
        let model = entity::Entity::find()
            .filter(entity::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> EnrollmentResult<Vec<Enrollment>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, input: NewEnrollment) -> EnrollmentResult<Enrollment> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(EnrollmentError::NotFound)?;

        let mut active_model = model.into_active_model();
        active_model.student_id = Set(input.student_id);
        active_model.plan_id = Set(input.plan_id);
        active_model.start_date = Set(input.start_date);
        active_model.end_date = Set(input.end_date);
        active_model.price = Set(input.price);

        let updated = active_model.update(&self.db).await.map_err(write_error)?;

        tracing::info!(enrollment_id = %id, "Updated enrollment");
        Ok(updated.into())
    }

    async fn cancel(&self, id: i32, at: DateTime<Utc>) -> EnrollmentResult<Option<Enrollment>> {
        // Only the first cancel matches the IS NULL filter
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::CanceledAt, Expr::value(at))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::CanceledAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(enrollment_id = %id, "Canceled enrollment");
        }

        self.get_by_id(id).await
    }
}
