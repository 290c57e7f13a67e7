//! Validation utilities.

use crate::MemoError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `MemoError` on failure.
    fn validate_request(&self) -> Result<(), MemoError> {
        self.validate().map_err(validation_errors_to_memo_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `MemoError`.
///
/// Field errors are flattened into a single `field: message` list so the
/// request layer can show them verbatim.
#[must_use]
pub fn validation_errors_to_memo_error(errors: ValidationErrors) -> MemoError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();

    MemoError::Validation(messages.join("; "))
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates a login name: 1 to 64 characters, no whitespace or control characters.
    pub fn valid_username(username: &str) -> Result<(), ValidationError> {
        let len = username.chars().count();
        if len == 0 {
            return Err(ValidationError::new("username_empty"));
        }
        if len > 64 {
            return Err(ValidationError::new("username_too_long"));
        }
        if username
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ValidationError::new("username_invalid_characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(custom(function = not_blank, message = "must not be blank"))]
        body: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank("\n\t").is_err());
    }

    #[test]
    fn test_valid_username() {
        assert!(valid_username("alice").is_ok());
        assert!(valid_username("bob_1").is_ok());
        assert!(valid_username("").is_err());
        assert!(valid_username("two words").is_err());
        assert!(valid_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_errors_flatten_into_message() {
        let err = Probe {
            body: " ".to_string(),
        }
        .validate_request()
        .unwrap_err();

        assert!(matches!(err, MemoError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: body: must not be blank");
    }
}
