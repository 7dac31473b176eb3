//! Configuration validation error types.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is NaN or infinite
    #[error("Field '{0}' must be finite")]
    NotFinite(String),

    /// Two fields violate an ordering or dependency constraint
    #[error("Field '{field}' must be {relation} '{other}'")]
    InvalidRelation {
        /// Field name
        field: String,
        /// Expected relation, e.g. "less than"
        relation: String,
        /// The other field
        other: String,
    },
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a not-finite error.
    pub fn not_finite(field: impl Into<String>) -> Self {
        ValidationError::NotFinite(field.into())
    }

    /// Create an invalid relation error.
    pub fn relation(
        field: impl Into<String>,
        relation: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidRelation {
            field: field.into(),
            relation: relation.into(),
            other: other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_out_of_range() {
        let err = ValidationError::out_of_range("terrain_smoothing_factor", 1.5_f32, 0.0, 1.0);
        let msg = err.to_string();
        assert!(msg.contains("terrain_smoothing_factor"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_validation_error_relation() {
        let err = ValidationError::relation("speed_low_threshold", "less than", "speed_medium_threshold");
        assert_eq!(
            err.to_string(),
            "Field 'speed_low_threshold' must be less than 'speed_medium_threshold'"
        );
    }

    #[test]
    fn test_validation_error_equality() {
        assert_eq!(
            ValidationError::not_finite("damper_max"),
            ValidationError::not_finite("damper_max")
        );
    }
}
