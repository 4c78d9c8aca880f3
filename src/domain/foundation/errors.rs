//! Validation errors shared by the domain value types.

use thiserror::Error;

/// Validation errors for domain value construction.
///
/// Returned by the validated factories on `Invoice`, `InvoiceDraft`, and
/// `Currency`, and by [`StateMachine::transition_to`] when a lifecycle
/// transition is not allowed.
///
/// [`StateMachine::transition_to`]: super::StateMachine::transition_to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    /// A numeric value was outside the allowed range.
    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    /// A value did not match the expected format.
    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an EmptyField error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an OutOfRange error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_field_name() {
        let err = ValidationError::empty_field("amount");
        assert_eq!(err.to_string(), "Field 'amount' cannot be empty");
    }

    #[test]
    fn out_of_range_displays_bounds() {
        let err = ValidationError::out_of_range("expiration_time", 0, 100, -5);
        assert_eq!(
            err.to_string(),
            "Field 'expiration_time' must be between 0 and 100, got -5"
        );
    }

    #[test]
    fn invalid_format_displays_reason() {
        let err = ValidationError::invalid_format("amount", "unexpected character 'x'");
        assert_eq!(
            err.to_string(),
            "Field 'amount' has invalid format: unexpected character 'x'"
        );
    }
}
