//! Validation rules for common data validation scenarios.

use crate::validation::error::{FieldError, ValidationErrorKind};

// ═══════════════════════════════════════════════════════════════════════════════
// Validation Rule Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// A validation rule that can be applied to a value.
pub trait ValidationRule<T> {
    /// Validate the value and return any errors.
    fn validate(&self, value: &T) -> Option<FieldError>;

    /// Get a description of this rule.
    fn description(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Required Field Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates a field is present and non-empty.
#[derive(Debug, Clone)]
pub struct Required;

impl ValidationRule<String> for Required {
    fn validate(&self, value: &String) -> Option<FieldError> {
        if value.trim().is_empty() {
            Some(FieldError::new(ValidationErrorKind::Required))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        "field is required".to_string()
    }
}

impl<T> ValidationRule<Vec<T>> for Required {
    fn validate(&self, value: &Vec<T>) -> Option<FieldError> {
        if value.is_empty() {
            Some(FieldError::new(ValidationErrorKind::Required))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        "field is required".to_string()
    }
}

/// Rule that validates an optional string is present and non-empty.
#[derive(Debug, Clone)]
pub struct RequiredString;

impl ValidationRule<Option<String>> for RequiredString {
    fn validate(&self, value: &Option<String>) -> Option<FieldError> {
        match value {
            Some(s) if !s.trim().is_empty() => None,
            _ => Some(FieldError::new(ValidationErrorKind::Required)),
        }
    }

    fn description(&self) -> String {
        "field is required and must not be empty".to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// String Length Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates string minimum length.
#[derive(Debug, Clone)]
pub struct MinLength(pub usize);

impl ValidationRule<String> for MinLength {
    fn validate(&self, value: &String) -> Option<FieldError> {
        let actual = value.chars().count();
        if actual < self.0 {
            Some(FieldError::new(ValidationErrorKind::MinLength {
                min: self.0,
                actual,
            }))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        format!("must be at least {} characters", self.0)
    }
}

/// Rule that validates string maximum length.
#[derive(Debug, Clone)]
pub struct MaxLength(pub usize);

impl ValidationRule<String> for MaxLength {
    fn validate(&self, value: &String) -> Option<FieldError> {
        let actual = value.chars().count();
        if actual > self.0 {
            Some(FieldError::new(ValidationErrorKind::MaxLength {
                max: self.0,
                actual,
            }))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        format!("must be at most {} characters", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_string() {
        assert!(Required.validate(&"home".to_string()).is_none());
        assert!(Required.validate(&"".to_string()).is_some());
        assert!(Required.validate(&"   ".to_string()).is_some());
    }

    #[test]
    fn test_required_vec() {
        let empty: Vec<u32> = vec![];
        assert!(ValidationRule::<Vec<u32>>::validate(&Required, &empty).is_some());
        assert!(ValidationRule::<Vec<u32>>::validate(&Required, &vec![1]).is_none());
    }

    #[test]
    fn test_required_option_string() {
        assert!(RequiredString.validate(&Some("x".to_string())).is_none());
        assert!(RequiredString.validate(&Some("  ".to_string())).is_some());
        assert!(RequiredString.validate(&None).is_some());
    }

    #[test]
    fn test_length_rules() {
        assert!(MinLength(3).validate(&"ab".to_string()).is_some());
        assert!(MinLength(3).validate(&"abc".to_string()).is_none());
        assert!(MaxLength(3).validate(&"abcd".to_string()).is_some());
        assert!(MaxLength(3).validate(&"abc".to_string()).is_none());
    }
}
