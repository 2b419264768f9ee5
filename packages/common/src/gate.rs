//! Lesson gate: which of the four lesson steps a student may open.
//!
//! The gate is derived from a progress snapshot on every request; nothing
//! about it is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four steps of a lesson, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    InitialTest = 1,
    Lectures = 2,
    Situational = 3,
    FinalTest = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Self::InitialTest,
        Self::Lectures,
        Self::Situational,
        Self::FinalTest,
    ];

    pub fn number(&self) -> i32 {
        *self as i32
    }

    pub fn from_number(n: i32) -> Option<Self> {
        match n {
            1 => Some(Self::InitialTest),
            2 => Some(Self::Lectures),
            3 => Some(Self::Situational),
            4 => Some(Self::FinalTest),
            _ => None,
        }
    }

    /// The step before this one, if any.
    pub fn previous(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Locked,
}

/// The two progress fields the gate depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 0 when the lesson was never started.
    pub current_step: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    pub fn not_started() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Per-step states for one student and one lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LessonGate {
    states: [StepState; 4],
}

impl LessonGate {
    pub fn evaluate(snapshot: &ProgressSnapshot) -> Self {
        let states = Step::ALL.map(|step| state_of(snapshot, step));
        Self { states }
    }

    pub fn state(&self, step: Step) -> StepState {
        self.states[(step.number() - 1) as usize]
    }

    pub fn can_access(&self, step: Step) -> bool {
        self.state(step) != StepState::Locked
    }

    /// Where to send a student who asked for `step`: `None` when the step is
    /// accessible, otherwise the step they should be working on.
    pub fn redirect_target(&self, step: Step) -> Option<Step> {
        if self.can_access(step) {
            return None;
        }
        Step::ALL
            .into_iter()
            .find(|s| self.state(*s) == StepState::Current)
            .or(Some(Step::InitialTest))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, StepState)> + '_ {
        Step::ALL.into_iter().zip(self.states)
    }
}

fn state_of(snapshot: &ProgressSnapshot, step: Step) -> StepState {
    if snapshot.is_completed() {
        return StepState::Completed;
    }
    // A lesson that was never started still lets the student begin.
    let current = snapshot.current_step.max(Step::InitialTest.number());
    let s = step.number();
    if s < current {
        StepState::Completed
    } else if s == current {
        StepState::Current
    } else {
        StepState::Locked
    }
}
