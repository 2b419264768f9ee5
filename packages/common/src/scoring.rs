use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{MAX_ANSWER_WEIGHT, SituationalAnswer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Number of answers must match number of questions (expected {expected}, got {actual})")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Test has no questions")]
    EmptyTest,
    #[error("Selected answer {selected} does not exist (question has {available} answers)")]
    SelectionOutOfRange { selected: i32, available: usize },
    #[error("Score must be between 0 and 5")]
    WeightOutOfRange(i32),
}

/// Outcome of grading one multiple-choice submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestScore {
    /// Percentage in 0..=100, not rounded.
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
}

/// Count submitted indices that match the answer key.
///
/// Positions beyond the shorter slice are ignored; callers that need strict
/// length checking use [`score_multiple_choice`].
pub fn count_correct(submitted: &[i32], correct: &[i32]) -> usize {
    submitted
        .iter()
        .zip(correct)
        .filter(|(given, expected)| given == expected)
        .count()
}

/// Grade a multiple-choice submission against the answer key.
///
/// `score = 100 * correct_count / total_questions`, unrounded.
pub fn score_multiple_choice(submitted: &[i32], correct: &[i32]) -> Result<TestScore, ScoringError> {
    if correct.is_empty() {
        return Err(ScoringError::EmptyTest);
    }
    if submitted.len() != correct.len() {
        return Err(ScoringError::LengthMismatch {
            expected: correct.len(),
            actual: submitted.len(),
        });
    }

    let correct_count = count_correct(submitted, correct);
    let total_questions = correct.len();
    let score = 100.0 * correct_count as f64 / total_questions as f64;

    Ok(TestScore {
        score,
        correct_count,
        total_questions,
    })
}

/// Check that a situational weight lies in 0..=5.
pub fn validate_weight(score: i32) -> Result<i32, ScoringError> {
    if (0..=MAX_ANSWER_WEIGHT).contains(&score) {
        Ok(score)
    } else {
        Err(ScoringError::WeightOutOfRange(score))
    }
}

/// Score of a situational choice: the chosen answer's pre-assigned weight.
pub fn situational_score(
    answers: &[SituationalAnswer],
    selected_index: i32,
) -> Result<i32, ScoringError> {
    let answer = usize::try_from(selected_index)
        .ok()
        .and_then(|i| answers.get(i))
        .ok_or(ScoringError::SelectionOutOfRange {
            selected: selected_index,
            available: answers.len(),
        })?;
    validate_weight(answer.score)
}

/// Round to one decimal place for display.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
