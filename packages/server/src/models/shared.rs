use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Generic acknowledgement body.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    #[schema(example = true)]
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate free text that must be present and at most 100k bytes.
pub fn validate_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() || value.len() > 100_000 {
        return Err(AppError::Validation(format!(
            "{field} must be non-empty and at most 100KB"
        )));
    }
    Ok(())
}

/// Treat blank optional strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Serialize a typed value for a JSON column.
pub fn to_json_column<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("JSON column encode error: {}", e)))
}

/// Decode a JSON column into its typed form. A stored value that does not fit
/// the type is a server-side fault, not a client error.
pub fn from_json_column<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("JSON column decode error: {}", e)))
}
