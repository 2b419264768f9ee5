//! Read-side composition of stored results into display-ready summaries.

use serde::{Deserialize, Serialize};

use crate::content::{MAX_ANSWER_WEIGHT, Question};
use crate::scoring::round_one_decimal;

/// Submitted index reported for a question the stored answer list does not cover.
pub const UNANSWERED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuestionOutcome {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
    /// The student's chosen option, or -1 if none was stored.
    pub user_answer: i32,
    pub is_correct: bool,
}

/// Compare stored answers with the test's current answer key.
///
/// Correctness is recomputed on every call, so editing the key after a
/// submission changes how that submission is displayed.
pub fn question_breakdown(questions: &[Question], submitted: &[i32]) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_answer = submitted.get(i).copied().unwrap_or(UNANSWERED);
            QuestionOutcome {
                question: q.question.clone(),
                options: q.options.clone(),
                correct_answer: q.correct_answer,
                user_answer,
                is_correct: user_answer == q.correct_answer,
            }
        })
        .collect()
}

pub fn correct_in(breakdown: &[QuestionOutcome]) -> usize {
    breakdown.iter().filter(|o| o.is_correct).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SituationalSummary {
    pub total_score: i32,
    /// Number of questions times the maximum weight.
    pub max_score: i32,
    pub answered: usize,
    pub question_count: usize,
}

/// Sum the recorded situational scores. `scores` has one entry per question,
/// `None` where the student has not answered.
pub fn situational_summary(scores: &[Option<i32>]) -> SituationalSummary {
    let question_count = scores.len();
    SituationalSummary {
        total_score: scores.iter().flatten().sum(),
        max_score: question_count as i32 * MAX_ANSWER_WEIGHT,
        answered: scores.iter().flatten().count(),
        question_count,
    }
}

/// Initial vs final test score, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScoreComparison {
    pub initial_score: Option<f64>,
    pub final_score: Option<f64>,
    /// `final - initial`, present only when both exist.
    pub improvement: Option<f64>,
}

impl ScoreComparison {
    pub fn new(initial: Option<f64>, final_: Option<f64>) -> Self {
        let improvement = match (initial, final_) {
            (Some(i), Some(f)) => Some(round_one_decimal(f - i)),
            _ => None,
        };
        Self {
            initial_score: initial.map(round_one_decimal),
            final_score: final_.map(round_one_decimal),
            improvement,
        }
    }
}

/// Mean of all scores rounded to one decimal, `None` for an empty slice.
pub fn average_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: f64 = scores.iter().sum();
    Some(round_one_decimal(sum / scores.len() as f64))
}
