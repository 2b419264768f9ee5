use chrono::{DateTime, Utc};
use common::content::SituationalAnswer;
use common::results::{QuestionOutcome, ScoreComparison, SituationalSummary};
use common::{LessonGate, ProgressSnapshot, Step, StepState};
use serde::{Deserialize, Serialize};

use crate::entity::student_progress;

/// A published lesson as listed for a student, with the caller's progress.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentLessonItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub lecture_count: u64,
    pub situational_count: u64,
    /// 0 when the student has not started the lesson.
    pub current_step: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct StepStatus {
    pub step: Step,
    #[schema(example = 2)]
    pub number: i32,
    pub state: StepState,
}

/// Progress of the caller through one lesson, with the derived gate.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    /// 0 when the lesson was never started.
    #[schema(example = 2)]
    pub current_step: i32,
    pub completed_at: Option<DateTime<Utc>>,
    /// One entry per step, in order.
    pub steps: Vec<StepStatus>,
}

impl From<ProgressSnapshot> for ProgressResponse {
    fn from(snapshot: ProgressSnapshot) -> Self {
        let steps = LessonGate::evaluate(&snapshot)
            .iter()
            .map(|(step, state)| StepStatus {
                step,
                number: step.number(),
                state,
            })
            .collect();
        Self {
            current_step: snapshot.current_step,
            completed_at: snapshot.completed_at,
            steps,
        }
    }
}

/// Snapshot of a stored progress row, or the zero state when there is none.
pub fn snapshot_of(row: Option<&student_progress::Model>) -> ProgressSnapshot {
    row.map(|p| ProgressSnapshot {
        current_step: p.current_step,
        completed_at: p.completed_at,
    })
    .unwrap_or_default()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AdvanceStepRequest {
    /// Target step: 2, 3 or 4.
    #[schema(example = 3)]
    pub step: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdvanceStepResponse {
    pub success: bool,
    /// False when progress was already at or past the requested step.
    pub advanced: bool,
    #[schema(example = 3)]
    pub current_step: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitTestRequest {
    /// Selected option index per question, in question order.
    #[schema(example = json!([0, 2, 1]))]
    pub answers: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitTestResponse {
    pub result_id: i32,
    /// Percentage 0-100, unrounded.
    #[schema(example = 66.66666666666667)]
    pub score: f64,
    #[schema(example = 2)]
    pub correct_count: usize,
    #[schema(example = 3)]
    pub total_questions: usize,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SituationalAnswerRequest {
    #[schema(example = 1)]
    pub selected_index: i32,
    /// Optional echo of the answer's weight; must match the stored weight.
    pub score: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SituationalAnswerResponse {
    pub success: bool,
    #[schema(example = 4)]
    pub score: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonRef {
    pub id: i32,
    pub title: String,
}

/// Most recent attempt at one test, graded against the current answer key.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestResultDetail {
    pub result_id: i32,
    pub test_id: i32,
    /// Score frozen at submission time.
    pub score: f64,
    /// Recomputed from the current answer key.
    pub correct_count: usize,
    pub total_questions: usize,
    pub completed_at: DateTime<Utc>,
    pub questions: Vec<QuestionOutcome>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SituationalResultItem {
    pub question_id: i32,
    pub position: i32,
    pub question: String,
    pub answers: Vec<SituationalAnswer>,
    /// Null when the student has not answered this question.
    pub selected_index: Option<i32>,
    pub score: Option<i32>,
    /// Conclusion of the selected answer.
    pub conclusion: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonResultsResponse {
    pub lesson: LessonRef,
    pub progress: ProgressResponse,
    pub initial_test: Option<TestResultDetail>,
    pub final_test: Option<TestResultDetail>,
    pub situational: Vec<SituationalResultItem>,
    pub situational_summary: SituationalSummary,
    pub comparison: ScoreComparison,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub completed_count: u64,
    pub in_progress_count: u64,
    /// Mean of every stored test score, rounded to one decimal.
    pub average_score: Option<f64>,
    pub lessons_attempted: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecentLesson {
    pub lesson_id: i32,
    pub title: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub initial_score: Option<f64>,
    pub final_score: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NextLesson {
    pub lesson_id: i32,
    pub title: String,
    pub current_step: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    /// Up to five most recently completed lessons.
    pub recent_lessons: Vec<RecentLesson>,
    /// The unfinished lesson the student is furthest along in.
    pub next_lesson: Option<NextLesson>,
}
