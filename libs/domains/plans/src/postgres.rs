use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    entity,
    error::{PlanError, PlanResult, db_error},
    models::{CreatePlan, PAGE_SIZE, Plan, UpdatePlan},
    repository::PlanRepository,
};

#[derive(Clone)]
pub struct PgPlanRepository {
    db: DatabaseConnection,
}

impl PgPlanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn create(&self, input: CreatePlan) -> PlanResult<Plan> {
        let active_model: entity::ActiveModel = input.into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                PlanError::AlreadyExists
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(plan_id = %model.id, "Created plan");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> PlanResult<Option<Plan>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_title(&self, title: &str) -> PlanResult<Option<Plan>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn search(&self, title: &str, page: u64) -> PlanResult<(Vec<Plan>, u64)> {
        let paginator = entity::Entity::find()
            .filter(Expr::cust_with_values(
                "title ILIKE $1",
                [format!("%{}%", title)],
            ))
            .order_by_asc(entity::Column::Duration)
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

    async fn update(&self, id: i32, input: UpdatePlan) -> PlanResult<Plan> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(PlanError::InvalidId)?;

        let mut active_model = model.clone().into_active_model();
        if let Some(title) = input.title {
            active_model.title = Set(title);
        }
        if let Some(duration) = input.duration {
            active_model.duration = Set(duration);
        }
        if let Some(price) = input.price {
            active_model.price = Set(price);
        }

        if !active_model.is_changed() {
            return Ok(model.into());
        }

        let updated = active_model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                PlanError::TitleTaken
            } else {
                db_error(e)
            }
        })?;

        tracing::info!(plan_id = %id, "Updated plan");
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> PlanResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(plan_id = %id, "Deleted plan");
        }
        Ok(result.rows_affected > 0)
    }
}
