use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One graded test submission. Rows are never updated; a resubmission adds a
/// new row and readers take the most recent one.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "test_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Submitted option indices, one per question.
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: serde_json::Value,
    /// Percentage frozen at submission time, unrounded.
    pub score: f64,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub test_id: i32,
    #[sea_orm(belongs_to, from = "test_id", to = "id")]
    pub test: HasOne<super::lesson_test::Entity>,

    pub completed_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
