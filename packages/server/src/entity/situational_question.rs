use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "situational_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub question: String,
    /// Answers stored as JSON array of {text, conclusion, score} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: serde_json::Value,

    #[sea_orm(default_value = 0)]
    pub position: i32,

    pub lesson_id: i32,
    #[sea_orm(belongs_to, from = "lesson_id", to = "id")]
    pub lesson: HasOne<super::lesson::Entity>,

    #[sea_orm(has_many)]
    pub results: HasMany<super::situational_result::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
