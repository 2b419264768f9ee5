#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::gate::Step;

/// Kind of a lesson test. A lesson holds at most one test of each kind.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    /// Taken before the lectures; step 1 of a lesson.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "INITIAL"))]
    Initial,
    /// Taken after the situational questions; step 4 of a lesson.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FINAL"))]
    Final,
}

impl TestType {
    pub const ALL: &'static [TestType] = &[Self::Initial, Self::Final];

    /// The lesson step at which this test is taken.
    pub fn step(&self) -> Step {
        match self {
            Self::Initial => Step::InitialTest,
            Self::Final => Step::FinalTest,
        }
    }

    /// The `current_step` a student's progress moves to once this test is submitted.
    pub fn next_step(&self) -> i32 {
        match self {
            Self::Initial => 2,
            Self::Final => 4,
        }
    }

    /// Returns true if submitting this test completes the lesson.
    pub fn completes_lesson(&self) -> bool {
        matches!(self, Self::Final)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Final => "FINAL",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid test type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTestTypeError {
    invalid: String,
}

impl fmt::Display for ParseTestTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid test type '{}'. Valid values: INITIAL, FINAL",
            self.invalid
        )
    }
}

impl std::error::Error for ParseTestTypeError {}

impl FromStr for TestType {
    type Err = ParseTestTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INITIAL" => Ok(Self::Initial),
            "FINAL" => Ok(Self::Final),
            _ => Err(ParseTestTypeError {
                invalid: s.to_string(),
            }),
        }
    }
}
