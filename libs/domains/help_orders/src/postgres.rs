use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::{
    entity,
    error::{HelpOrderError, HelpOrderResult, db_error},
    models::HelpOrder,
    repository::HelpOrderRepository,
};

#[derive(Clone)]
pub struct PgHelpOrderRepository {
    db: DatabaseConnection,
}

impl PgHelpOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HelpOrderRepository for PgHelpOrderRepository {
    async fn create(&self, student_id: i32, question: String) -> HelpOrderResult<HelpOrder> {
        let model = entity::new_question(student_id, question)
            .insert(&self.db)
            .await
            .map_err(db_error)?;

        tracing::info!(help_order_id = %model.id, student_id = %student_id, "Created help order");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> HelpOrderResult<Option<HelpOrder>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn list_unanswered(&self) -> HelpOrderResult<Vec<HelpOrder>> {
        let models = entity::Entity::find()
            .filter(entity::Column::AnsweredAt.is_null())
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_by_student(&self, student_id: i32) -> HelpOrderResult<Vec<HelpOrder>> {
        let models = entity::Entity::find()
            .filter(entity::Column::StudentId.eq(student_id))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn answer(
        &self,
        id: i32,
        answer: String,
        at: DateTime<Utc>,
    ) -> HelpOrderResult<HelpOrder> {
        // Only one UPDATE can match while answered_at is NULL
        let result = entity::Entity::update_many()
            .col_expr(entity::Column::Answer, Expr::value(answer))
            .col_expr(entity::Column::AnsweredAt, Expr::value(at))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::AnsweredAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        let help_order = self.get_by_id(id).await?.ok_or(HelpOrderError::NotFound)?;

        if result.rows_affected == 0 {
            return Err(HelpOrderError::AlreadyAnswered);
        }

        tracing::info!(help_order_id = %id, "Answered help order");
        Ok(help_order)
    }
}
