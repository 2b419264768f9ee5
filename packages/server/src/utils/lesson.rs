use std::collections::HashMap;

use common::TestType;
use common::content::{LessonInventory, Question};
use sea_orm::sea_query::{Query as SeaQuery, SelectStatement};
use sea_orm::*;

use crate::entity::{lecture, lesson, lesson_test, situational_question, student_progress, test_result};
use crate::error::AppError;
use crate::models::shared::from_json_column;

/// Look up a lesson by ID, returning 404 if not found.
pub async fn find_lesson<C: ConnectionTrait>(db: &C, id: i32) -> Result<lesson::Model, AppError> {
    lesson::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))
}

/// Look up a test by ID, returning 404 unless it belongs to `lesson_id`.
pub async fn find_lesson_test<C: ConnectionTrait>(
    db: &C,
    lesson_id: i32,
    test_id: i32,
) -> Result<lesson_test::Model, AppError> {
    let test = lesson_test::Entity::find_by_id(test_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".into()))?;

    if test.lesson_id != lesson_id {
        return Err(AppError::NotFound("Test not found".into()));
    }
    Ok(test)
}

pub async fn find_test_by_type<C: ConnectionTrait>(
    db: &C,
    lesson_id: i32,
    test_type: TestType,
) -> Result<Option<lesson_test::Model>, AppError> {
    Ok(lesson_test::Entity::find()
        .filter(lesson_test::Column::LessonId.eq(lesson_id))
        .filter(lesson_test::Column::TestType.eq(test_type))
        .one(db)
        .await?)
}

/// Look up a situational question, returning 404 unless it belongs to `lesson_id`.
pub async fn find_situational_question<C: ConnectionTrait>(
    db: &C,
    lesson_id: i32,
    question_id: i32,
) -> Result<situational_question::Model, AppError> {
    let question = situational_question::Entity::find_by_id(question_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Situational question not found".into()))?;

    if question.lesson_id != lesson_id {
        return Err(AppError::NotFound("Situational question not found".into()));
    }
    Ok(question)
}

pub async fn find_progress<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    lesson_id: i32,
) -> Result<Option<student_progress::Model>, AppError> {
    Ok(student_progress::Entity::find_by_id((user_id, lesson_id))
        .one(db)
        .await?)
}

/// The most recent result of one user for one test.
pub async fn latest_result<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    test_id: i32,
) -> Result<Option<test_result::Model>, AppError> {
    Ok(test_result::Entity::find()
        .filter(test_result::Column::UserId.eq(user_id))
        .filter(test_result::Column::TestId.eq(test_id))
        .order_by_desc(test_result::Column::CompletedAt)
        .order_by_desc(test_result::Column::Id)
        .one(db)
        .await?)
}

/// Subquery selecting the IDs of every test of a lesson.
pub fn lesson_test_ids(lesson_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(lesson_test::Column::Id)
        .from(lesson_test::Entity)
        .and_where(lesson_test::Column::LessonId.eq(lesson_id))
        .to_owned()
}

pub fn test_questions(test: &lesson_test::Model) -> Result<Vec<Question>, AppError> {
    from_json_column(&test.questions)
}

/// Count the content of each lesson in `lesson_ids`. Lessons without any
/// content are present with an empty inventory.
pub async fn lesson_inventories<C: ConnectionTrait>(
    db: &C,
    lesson_ids: &[i32],
) -> Result<HashMap<i32, LessonInventory>, AppError> {
    let mut inventories: HashMap<i32, LessonInventory> = lesson_ids
        .iter()
        .map(|&id| (id, LessonInventory::default()))
        .collect();
    if lesson_ids.is_empty() {
        return Ok(inventories);
    }

    let lecture_counts = lecture::Entity::find()
        .select_only()
        .column(lecture::Column::LessonId)
        .column_as(lecture::Column::Id.count(), "count")
        .filter(lecture::Column::LessonId.is_in(lesson_ids.to_vec()))
        .group_by(lecture::Column::LessonId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;
    for (lesson_id, count) in lecture_counts {
        if let Some(inv) = inventories.get_mut(&lesson_id) {
            inv.lecture_count = count as u64;
        }
    }

    let situational_counts = situational_question::Entity::find()
        .select_only()
        .column(situational_question::Column::LessonId)
        .column_as(situational_question::Column::Id.count(), "count")
        .filter(situational_question::Column::LessonId.is_in(lesson_ids.to_vec()))
        .group_by(situational_question::Column::LessonId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?;
    for (lesson_id, count) in situational_counts {
        if let Some(inv) = inventories.get_mut(&lesson_id) {
            inv.situational_count = count as u64;
        }
    }

    let tests = lesson_test::Entity::find()
        .select_only()
        .column(lesson_test::Column::LessonId)
        .column(lesson_test::Column::TestType)
        .filter(lesson_test::Column::LessonId.is_in(lesson_ids.to_vec()))
        .into_tuple::<(i32, TestType)>()
        .all(db)
        .await?;
    for (lesson_id, test_type) in tests {
        if let Some(inv) = inventories.get_mut(&lesson_id) {
            match test_type {
                TestType::Initial => inv.has_initial_test = true,
                TestType::Final => inv.has_final_test = true,
            }
        }
    }

    Ok(inventories)
}
