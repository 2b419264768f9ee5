use chrono::{DateTime, Utc};
use common::TestType;
use common::content::{LessonInventory, Question, SituationalAnswer, validate_questions, validate_situational};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entity::{lecture, lesson, situational_question};
use crate::error::AppError;

use super::shared::{from_json_column, validate_text, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLessonRequest {
    #[schema(example = "HTML basics")]
    pub title: String,
    #[schema(example = "Tags, attributes and document structure.")]
    pub description: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<lesson::Model> for LessonResponse {
    fn from(m: lesson::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A lesson with a count of each kind of content it holds.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_by: i32,
    pub lecture_count: u64,
    pub situational_count: u64,
    pub has_initial_test: bool,
    pub has_final_test: bool,
    /// True when the lesson has all four steps and is visible to students.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LessonSummary {
    pub fn new(m: lesson::Model, inventory: LessonInventory) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            created_by: m.created_by,
            lecture_count: inventory.lecture_count,
            situational_count: inventory.situational_count,
            has_initial_test: inventory.has_initial_test,
            has_final_test: inventory.has_final_test,
            is_published: inventory.is_published(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// One lecture in a replace-set request. Entries with the `id` of an existing
/// lecture of the lesson update it; entries without one create a lecture.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LectureInput {
    pub id: Option<i32>,
    #[schema(example = "Block and inline elements")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplaceLecturesRequest {
    /// Full ordered list; lectures of the lesson missing from it are deleted.
    pub lectures: Vec<LectureInput>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LectureResponse {
    pub id: i32,
    pub lesson_id: i32,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub file_path: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<lecture::Model> for LectureResponse {
    fn from(m: lecture::Model) -> Self {
        Self {
            id: m.id,
            lesson_id: m.lesson_id,
            title: m.title,
            description: m.description,
            video_url: m.video_url,
            file_path: m.file_path,
            position: m.position,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertTestRequest {
    pub questions: Vec<Question>,
}

/// A lesson test. `id` is null when the lesson has no test of this type yet.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestResponse {
    pub id: Option<i32>,
    pub lesson_id: i32,
    pub test_type: TestType,
    pub questions: Vec<Question>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TestResponse {
    pub fn empty(lesson_id: i32, test_type: TestType) -> Self {
        Self {
            id: None,
            lesson_id,
            test_type,
            questions: vec![],
            updated_at: None,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SituationalInput {
    pub id: Option<i32>,
    #[schema(example = "A client changes the scope mid-sprint. What do you do?")]
    pub question: String,
    pub answers: Vec<SituationalAnswer>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplaceSituationalRequest {
    /// Full ordered list; questions of the lesson missing from it are deleted.
    pub questions: Vec<SituationalInput>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SituationalQuestionResponse {
    pub id: i32,
    pub lesson_id: i32,
    pub position: i32,
    pub question: String,
    pub answers: Vec<SituationalAnswer>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<situational_question::Model> for SituationalQuestionResponse {
    type Error = AppError;

    fn try_from(m: situational_question::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            answers: from_json_column(&m.answers)?,
            id: m.id,
            lesson_id: m.lesson_id,
            position: m.position,
            question: m.question,
            created_at: m.created_at,
        })
    }
}

pub fn validate_create_lesson(req: &CreateLessonRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_text("Description", &req.description)?;
    Ok(())
}

pub fn validate_update_lesson(req: &UpdateLessonRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_text("Description", description)?;
    }
    Ok(())
}

/// Reject a replace-set list that names the same existing row twice.
fn validate_unique_ids(ids: impl Iterator<Item = i32>, name: &str) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} ID: {id}")));
        }
    }
    Ok(())
}

pub fn validate_replace_lectures(req: &ReplaceLecturesRequest) -> Result<(), AppError> {
    validate_unique_ids(req.lectures.iter().filter_map(|l| l.id), "lecture")?;
    for (i, lecture) in req.lectures.iter().enumerate() {
        validate_title(&lecture.title)
            .map_err(|_| AppError::Validation(format!("Lecture {}: title must be 1-256 characters", i + 1)))?;
        if lecture.description.len() > 100_000 {
            return Err(AppError::Validation(format!(
                "Lecture {}: description must be at most 100KB",
                i + 1
            )));
        }
    }
    Ok(())
}

pub fn validate_upsert_test(req: &UpsertTestRequest) -> Result<(), AppError> {
    validate_questions(&req.questions)?;
    Ok(())
}

pub fn validate_replace_situational(req: &ReplaceSituationalRequest) -> Result<(), AppError> {
    validate_unique_ids(req.questions.iter().filter_map(|q| q.id), "question")?;
    for (i, q) in req.questions.iter().enumerate() {
        validate_situational(i + 1, &q.question, &q.answers)?;
    }
    Ok(())
}
