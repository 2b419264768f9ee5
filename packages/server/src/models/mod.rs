pub mod auth;
pub mod lesson;
pub mod shared;
pub mod student;
