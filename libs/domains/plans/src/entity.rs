use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub duration: i32,
    pub price: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Plan {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            duration: model.duration,
            price: model.price,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<crate::models::CreatePlan> for ActiveModel {
    fn from(input: crate::models::CreatePlan) -> Self {
        ActiveModel {
            id: NotSet,
            title: Set(input.title),
            duration: Set(input.duration),
            price: Set(input.price),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
