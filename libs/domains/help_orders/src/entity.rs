use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "help_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    #[sea_orm(column_type = "Text")]
    pub question: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub answer: Option<String>,
    pub answered_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::HelpOrder {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            question: model.question,
            answer: model.answer,
            answered_at: model.answered_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Insert model for a new, unanswered question.
pub(crate) fn new_question(student_id: i32, question: String) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        student_id: Set(student_id),
        question: Set(question),
        answer: Set(None),
        answered_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
}
