use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lecture")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub video_url: Option<String>,
    pub file_path: Option<String>,

    /// Display order within the lesson, starting at 0.
    #[sea_orm(default_value = 0)]
    pub position: i32,

    pub lesson_id: i32,
    #[sea_orm(belongs_to, from = "lesson_id", to = "id")]
    pub lesson: HasOne<super::lesson::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
