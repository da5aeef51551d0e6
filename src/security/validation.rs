//! Request Validation Module
//!
//! Provides field-level validation for request payloads: length, numeric
//! range, email shape and pagination bounds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation error types
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' is too long (max: {max}, got: {got})")]
    TooLong {
        field: String,
        max: usize,
        got: usize,
    },

    #[error("Field '{field}' is too short (min: {min}, got: {got})")]
    TooShort {
        field: String,
        min: usize,
        got: usize,
    },

    #[error("Field '{field}' is not a valid email: {value}")]
    InvalidEmail { field: String, value: String },

    #[error("Field '{field}' exceeds maximum value: max={max}, got={got}")]
    ExceedsMax { field: String, max: i64, got: i64 },

    #[error("Field '{field}' is below minimum value: min={min}, got={got}")]
    BelowMin { field: String, min: i64, got: i64 },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } => field.as_str(),
            Self::TooLong { field, .. } => field.as_str(),
            Self::TooShort { field, .. } => field.as_str(),
            Self::InvalidEmail { field, .. } => field.as_str(),
            Self::ExceedsMax { field, .. } => field.as_str(),
            Self::BelowMin { field, .. } => field.as_str(),
        }
    }
}

impl From<ValidationError> for crate::error::AppError {
    fn from(e: ValidationError) -> Self {
        crate::error::AppError::Validation(e.to_string())
    }
}

/// Validation result type
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Request validator implementation
#[derive(Debug, Clone, Default)]
pub struct RequestValidator;

impl RequestValidator {
    /// Create new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate string length bounds
    pub fn validate_length(
        &self,
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult<()> {
        let len = value.chars().count();

        if let Some(min) = min {
            if len < min {
                return Err(ValidationError::TooShort {
                    field: field.to_string(),
                    min,
                    got: len,
                });
            }
        }

        if let Some(max) = max {
            if len > max {
                return Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max,
                    got: len,
                });
            }
        }

        Ok(())
    }

    /// Validate a numeric range
    pub fn validate_range(
        &self,
        field: &str,
        value: i64,
        min: i64,
        max: i64,
    ) -> ValidationResult<()> {
        if value < min {
            return Err(ValidationError::BelowMin {
                field: field.to_string(),
                min,
                got: value,
            });
        }
        if value > max {
            return Err(ValidationError::ExceedsMax {
                field: field.to_string(),
                max,
                got: value,
            });
        }
        Ok(())
    }

    /// Validate email shape (local@domain.tld)
    pub fn validate_email(&self, field: &str, value: &str) -> ValidationResult<()> {
        let invalid = || ValidationError::InvalidEmail {
            field: field.to_string(),
            value: value.to_string(),
        };

        let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(invalid());
        }
        if domain.starts_with('.') || domain.ends_with('.') {
            return Err(invalid());
        }
        if value.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(())
    }

    /// Validate pagination bounds: page >= 1, page_size in [1, 100]
    pub fn validate_pagination(&self, page: usize, page_size: usize) -> ValidationResult<()> {
        self.validate_range("page", page as i64, 1, i64::MAX)?;
        self.validate_range("page_size", page_size as i64, 1, 100)?;
        Ok(())
    }
}

/// Common field validators
pub mod validators {
    use super::*;

    /// Validate a username (3 to 50 characters)
    pub fn validate_username(username: &str) -> ValidationResult<()> {
        RequestValidator::new().validate_length("username", username, Some(3), Some(50))
    }

    /// Validate a password (at least 8 characters)
    pub fn validate_password(password: &str) -> ValidationResult<()> {
        RequestValidator::new().validate_length("password", password, Some(8), Some(128))
    }

    /// Validate a character name (1 to 100 characters)
    pub fn validate_character_name(name: &str) -> ValidationResult<()> {
        RequestValidator::new().validate_length("character_name", name, Some(1), Some(100))
    }

    /// Validate a chat message (1 to 2000 characters)
    pub fn validate_chat_message(message: &str) -> ValidationResult<()> {
        RequestValidator::new().validate_length("message", message, Some(1), Some(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let validator = RequestValidator::new();
        assert!(validator.validate_length("name", "abc", Some(1), Some(5)).is_ok());
        assert!(validator.validate_length("name", "", Some(1), Some(5)).is_err());
        assert!(validator
            .validate_length("name", "abcdef", Some(1), Some(5))
            .is_err());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let validator = RequestValidator::new();
        // 四个汉字，12 字节
        assert!(validator.validate_length("name", "林若雪传", None, Some(4)).is_ok());
    }

    #[test]
    fn test_range_bounds() {
        let validator = RequestValidator::new();
        assert!(validator.validate_range("birth_month", 6, 1, 12).is_ok());
        assert!(validator.validate_range("birth_month", 0, 1, 12).is_err());
        assert!(validator.validate_range("birth_month", 13, 1, 12).is_err());
    }

    #[test]
    fn test_email_shapes() {
        let validator = RequestValidator::new();
        assert!(validator.validate_email("email", "a@b.com").is_ok());
        assert!(validator.validate_email("email", "a.b@c.d.com").is_ok());
        assert!(validator.validate_email("email", "nodomain").is_err());
        assert!(validator.validate_email("email", "a@nodot").is_err());
        assert!(validator.validate_email("email", "a b@c.com").is_err());
        assert!(validator.validate_email("email", "@c.com").is_err());
    }

    #[test]
    fn test_pagination_bounds() {
        let validator = RequestValidator::new();
        assert!(validator.validate_pagination(1, 20).is_ok());
        assert!(validator.validate_pagination(1, 100).is_ok());
        assert!(validator.validate_pagination(0, 20).is_err());
        assert!(validator.validate_pagination(1, 0).is_err());
        assert!(validator.validate_pagination(1, 101).is_err());
    }

    #[test]
    fn test_common_validators() {
        assert!(validators::validate_username("alice").is_ok());
        assert!(validators::validate_username("ab").is_err());
        assert!(validators::validate_password("secret-password").is_ok());
        assert!(validators::validate_password("short").is_err());
        assert!(validators::validate_character_name("林若雪").is_ok());
        assert!(validators::validate_chat_message("").is_err());
    }
}
