use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub student_id: i32,
    pub plan_id: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub price: f64,
    pub canceled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Enrollment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            plan_id: model.plan_id,
            start_date: model.start_date,
            end_date: model.end_date,
            price: model.price,
            active: false,
            canceled_at: model.canceled_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
        .refreshed()
    }
}

impl From<crate::models::NewEnrollment> for ActiveModel {
    fn from(input: crate::models::NewEnrollment) -> Self {
        ActiveModel {
            id: NotSet,
            student_id: Set(input.student_id),
            plan_id: Set(input.plan_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            price: Set(input.price),
            canceled_at: NotSet,
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}
