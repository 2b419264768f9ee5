use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

const MAX_USERNAME_CHARS: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Username and password, used for both registration and login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct Credentials {
    /// 1-32 characters: letters, digits and underscores.
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// 8-128 characters.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_registration(payload: &Credentials) -> Result<(), AppError> {
    validate_username(payload.username.trim())?;
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&payload.password.len()) {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Login only checks presence; wrong values fail as invalid credentials.
pub fn validate_login(payload: &Credentials) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// Every self-registered account starts as a student.
    #[schema(example = "student")]
    pub role: String,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// A user together with the permissions granted by their role.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserProfile {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
    #[schema(example = "student")]
    pub role: String,
    #[schema(example = json!(["lesson:study"]))]
    pub permissions: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: UserProfile,
}
