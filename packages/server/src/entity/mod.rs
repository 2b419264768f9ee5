pub mod lecture;
pub mod lesson;
pub mod role;
pub mod role_permission;
pub mod situational_question;
pub mod situational_result;
pub mod student_progress;
pub mod test_result;
pub mod user;
