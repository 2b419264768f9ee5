pub mod content;
pub mod gate;
pub mod progress;
pub mod results;
pub mod scoring;
pub mod test_type;

pub use gate::{LessonGate, ProgressSnapshot, Step, StepState};
pub use progress::ResubmissionPolicy;
pub use test_type::TestType;
