//! Transition rules for a student's progress through one lesson.
//!
//! Persistence lives in the server; these functions only decide what the new
//! progress row should look like.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::{LessonGate, ProgressSnapshot, Step};
use crate::test_type::TestType;

/// Lowest and highest step accepted by an explicit step advance.
pub const MIN_ADVANCE_STEP: i32 = 2;
pub const MAX_ADVANCE_STEP: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("currentStep must be 2, 3, or 4")]
    StepOutOfRange(i32),
    #[error("Step {requested} is locked; continue from step {current}")]
    StepLocked { requested: i32, current: i32 },
}

/// How a test submission treats progress that is already further along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResubmissionPolicy {
    /// Always move to the submitted test's step, even backwards.
    #[default]
    Overwrite,
    /// Never move backwards; keep the furthest step reached.
    KeepFurthest,
}

/// Progress fields written by a test submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub current_step: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ProgressState> for ProgressSnapshot {
    fn from(state: ProgressState) -> Self {
        Self {
            current_step: state.current_step,
            completed_at: state.completed_at,
        }
    }
}

/// Decide the progress row after a test of `test_type` is submitted.
///
/// A FINAL submission always stamps `completed_at` with `now`. An INITIAL
/// submission leaves any existing `completed_at` as it was.
pub fn apply_test_submission(
    existing: Option<ProgressState>,
    test_type: TestType,
    policy: ResubmissionPolicy,
    now: DateTime<Utc>,
) -> ProgressState {
    let next_step = test_type.next_step();
    let current_step = match (policy, existing) {
        (ResubmissionPolicy::KeepFurthest, Some(prev)) => prev.current_step.max(next_step),
        _ => next_step,
    };
    let completed_at = if test_type.completes_lesson() {
        Some(now)
    } else {
        existing.and_then(|prev| prev.completed_at)
    };
    ProgressState {
        current_step,
        completed_at,
    }
}

/// Validate the target of an explicit step advance.
pub fn validate_advance_step(step: i32) -> Result<i32, ProgressError> {
    if (MIN_ADVANCE_STEP..=MAX_ADVANCE_STEP).contains(&step) {
        Ok(step)
    } else {
        Err(ProgressError::StepOutOfRange(step))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Write `current_step = step`.
    Apply(i32),
    /// Progress is already at or beyond the requested step; write nothing.
    AlreadyReached(i32),
}

/// Decide whether an explicit advance to `requested` changes anything.
pub fn plan_advance(existing_step: Option<i32>, requested: i32) -> Advance {
    match existing_step {
        Some(current) if current >= requested => Advance::AlreadyReached(current),
        _ => Advance::Apply(requested),
    }
}

/// Reject a test submission whose step the gate reports as locked.
pub fn ensure_test_unlocked(snapshot: &ProgressSnapshot, test_type: TestType) -> Result<(), ProgressError> {
    ensure_step_unlocked(snapshot, test_type.step())
}

/// Reject an advance to `step` unless the step being finished is open.
///
/// Advancing to 3 finishes the lectures (step 2), so step 2 must be open.
pub fn ensure_advance_unlocked(snapshot: &ProgressSnapshot, step: i32) -> Result<(), ProgressError> {
    let target = Step::from_number(step).ok_or(ProgressError::StepOutOfRange(step))?;
    match target.previous() {
        Some(finished) => ensure_step_unlocked(snapshot, finished),
        None => Ok(()),
    }
}

fn ensure_step_unlocked(snapshot: &ProgressSnapshot, step: Step) -> Result<(), ProgressError> {
    let gate = LessonGate::evaluate(snapshot);
    if gate.can_access(step) {
        return Ok(());
    }
    let current = gate
        .redirect_target(step)
        .unwrap_or(Step::InitialTest)
        .number();
    Err(ProgressError::StepLocked {
        requested: step.number(),
        current,
    })
}
