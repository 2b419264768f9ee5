use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "situational_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "user_question")]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(unique_key = "user_question")]
    pub situational_question_id: i32,
    #[sea_orm(belongs_to, from = "situational_question_id", to = "id")]
    pub situational_question: HasOne<super::situational_question::Entity>,

    /// Denormalized so a restart can clear a lesson without joining questions.
    pub lesson_id: i32,
    #[sea_orm(belongs_to, from = "lesson_id", to = "id")]
    pub lesson: HasOne<super::lesson::Entity>,

    pub selected_index: i32,
    /// Weight of the selected answer, 0-5.
    pub score: i32,

    pub answered_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
