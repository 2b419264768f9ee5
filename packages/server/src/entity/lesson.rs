use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lesson")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Admin who created the lesson.
    pub created_by: i32,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub lectures: HasMany<super::lecture::Entity>,

    #[sea_orm(has_many)]
    pub tests: HasMany<super::lesson_test::Entity>,

    #[sea_orm(has_many)]
    pub situational_questions: HasMany<super::situational_question::Entity>,

    #[sea_orm(has_many)]
    pub progress: HasMany<super::student_progress::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
