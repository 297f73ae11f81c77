use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    entity,
    error::{StudentError, StudentResult, db_error},
    models::{CreateStudent, PAGE_SIZE, Student, UpdateStudent},
    repository::StudentRepository,
};

#[derive(Clone)]
pub struct PgStudentRepository {
    db: DatabaseConnection,
}

impl PgStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn create(&self, input: CreateStudent) -> StudentResult<Student> {
        let active_model: entity::ActiveModel = input.into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                StudentError::AlreadyExists
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(student_id = %model.id, "Created student");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> StudentResult<Option<Student>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> StudentResult<Option<Student>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn search(&self, name: &str, page: u64) -> StudentResult<(Vec<Student>, u64)> {
        let paginator = entity::Entity::find()
            .filter(Expr::cust_with_values(
                "name ILIKE $1",
                [format!("%{}%", name)],
            ))
            .order_by_asc(entity::Column::Name)
            .order_by_asc(entity::Column::Id)
            .paginate(&self.db, PAGE_SIZE);

        let total = paginator.num_items().await.map_err(db_error)?;
        let index = page.saturating_sub(1);
        if index >= total.div_ceil(PAGE_SIZE) {
            return Ok((Vec::new(), total));
        }
        let models = paginator.fetch_page(index).await.map_err(db_error)?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, id: i32, input: UpdateStudent) -> StudentResult<Student> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(StudentError::InvalidId)?;

        if let Some(ref email) = input.email {
            if email != &model.email {
                let taken = entity::Entity::find()
                    .filter(entity::Column::Email.eq(email.as_str()))
                    .filter(entity::Column::Id.ne(id))
                    .one(&self.db)
                    .await
                    .map_err(db_error)?
                    .is_some();

                if taken {
                    return Err(StudentError::EmailTaken);
                }
            }
        }

        let mut active_model = model.clone().into_active_model();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(email) = input.email {
            active_model.email = Set(email);
        }
        if let Some(age) = input.age {
            active_model.age = Set(age);
        }
        if let Some(weight) = input.weight {
            active_model.weight = Set(weight);
        }
        if let Some(height) = input.height {
            active_model.height = Set(height);
        }

        if !active_model.is_changed() {
            return Ok(model.into());
        }

        let updated = active_model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                StudentError::EmailTaken
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(student_id = %id, "Updated student");
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> StudentResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(student_id = %id, "Deleted student");
        }
        Ok(result.rows_affected > 0)
    }
}
