//! Authoring-side value types for lesson tests and situational questions.
//!
//! These are stored as JSON arrays in the database; validation happens here so
//! every stored payload has a known shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every multiple-choice question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

pub const MIN_SITUATIONAL_ANSWERS: usize = 2;
pub const MAX_SITUATIONAL_ANSWERS: usize = 6;

/// Highest weight an admin may assign to a situational answer.
pub const MAX_ANSWER_WEIGHT: i32 = 5;

const MIN_PROMPT_CHARS: usize = 10;
const MIN_ANSWER_TEXT_CHARS: usize = 5;
const MIN_CONCLUSION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("A test must contain at least one question")]
    NoQuestions,
    #[error("Question {0}: text must not be empty")]
    EmptyQuestion(usize),
    #[error("Question {index}: must have exactly 4 options, got {actual}")]
    OptionCount { index: usize, actual: usize },
    #[error("Question {0}: options must not be empty")]
    EmptyOption(usize),
    #[error("Question {index}: correct answer must be 0-3, got {actual}")]
    CorrectAnswerOutOfRange { index: usize, actual: i32 },
    #[error("Question {0}: text must be at least 10 characters")]
    PromptTooShort(usize),
    #[error("Question {index}: must have 2-6 answers, got {actual}")]
    AnswerCount { index: usize, actual: usize },
    #[error("Question {question}, Answer {answer}: text must be at least 5 characters")]
    AnswerTextTooShort { question: usize, answer: usize },
    #[error("Question {question}, Answer {answer}: conclusion must be at least 10 characters")]
    ConclusionTooShort { question: usize, answer: usize },
    #[error("Question {question}, Answer {answer}: score must be between 0 and 5")]
    WeightOutOfRange { question: usize, answer: usize },
}

/// A multiple-choice question of an INITIAL or FINAL test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Question {
    /// Question prompt.
    #[schema(example = "What does HTML stand for?")]
    pub question: String,
    /// Exactly four answer options.
    pub options: Vec<String>,
    /// Index (0-3) of the correct option.
    #[schema(example = 0)]
    pub correct_answer: i32,
}

impl Question {
    /// Returns a copy with surrounding whitespace removed from all text.
    pub fn trimmed(&self) -> Self {
        Self {
            question: self.question.trim().to_string(),
            options: self.options.iter().map(|o| o.trim().to_string()).collect(),
            correct_answer: self.correct_answer,
        }
    }
}

/// One option of a situational question.
///
/// Options have no single correct answer; each carries its own weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SituationalAnswer {
    pub text: String,
    /// Explanation shown to the student after choosing this option.
    pub conclusion: String,
    /// Weight in 0..=5.
    #[schema(example = 4)]
    pub score: i32,
}

impl SituationalAnswer {
    pub fn trimmed(&self) -> Self {
        Self {
            text: self.text.trim().to_string(),
            conclusion: self.conclusion.trim().to_string(),
            score: self.score,
        }
    }
}

/// Validate the question list of a test. Indices in errors are 1-based.
pub fn validate_questions(questions: &[Question]) -> Result<(), ContentError> {
    if questions.is_empty() {
        return Err(ContentError::NoQuestions);
    }
    for (i, q) in questions.iter().enumerate() {
        let index = i + 1;
        if q.question.trim().is_empty() {
            return Err(ContentError::EmptyQuestion(index));
        }
        if q.options.len() != OPTIONS_PER_QUESTION {
            return Err(ContentError::OptionCount {
                index,
                actual: q.options.len(),
            });
        }
        if q.options.iter().any(|o| o.trim().is_empty()) {
            return Err(ContentError::EmptyOption(index));
        }
        if !(0..OPTIONS_PER_QUESTION as i32).contains(&q.correct_answer) {
            return Err(ContentError::CorrectAnswerOutOfRange {
                index,
                actual: q.correct_answer,
            });
        }
    }
    Ok(())
}

/// Validate one situational question's prompt and answers. `index` is 1-based.
pub fn validate_situational(
    index: usize,
    prompt: &str,
    answers: &[SituationalAnswer],
) -> Result<(), ContentError> {
    if prompt.trim().chars().count() < MIN_PROMPT_CHARS {
        return Err(ContentError::PromptTooShort(index));
    }
    if !(MIN_SITUATIONAL_ANSWERS..=MAX_SITUATIONAL_ANSWERS).contains(&answers.len()) {
        return Err(ContentError::AnswerCount {
            index,
            actual: answers.len(),
        });
    }
    for (j, a) in answers.iter().enumerate() {
        let answer = j + 1;
        if a.text.trim().chars().count() < MIN_ANSWER_TEXT_CHARS {
            return Err(ContentError::AnswerTextTooShort {
                question: index,
                answer,
            });
        }
        if a.conclusion.trim().chars().count() < MIN_CONCLUSION_CHARS {
            return Err(ContentError::ConclusionTooShort {
                question: index,
                answer,
            });
        }
        if !(0..=MAX_ANSWER_WEIGHT).contains(&a.score) {
            return Err(ContentError::WeightOutOfRange {
                question: index,
                answer,
            });
        }
    }
    Ok(())
}

/// What a lesson currently contains, for the published predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonInventory {
    pub lecture_count: u64,
    pub situational_count: u64,
    pub has_initial_test: bool,
    pub has_final_test: bool,
}

impl LessonInventory {
    /// Students only see lessons that have every part of the 4-step sequence.
    pub fn is_published(&self) -> bool {
        self.lecture_count > 0
            && self.situational_count > 0
            && self.has_initial_test
            && self.has_final_test
    }
}
