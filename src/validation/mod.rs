//! Declarative payload validation, checked once at the directory boundary.
//!
//! This module provides:
//!
//! - **Validation Rules**: Pre-built rules for common scenarios
//!   - Required fields (strings, options, collections)
//!   - String length constraints (min, max)
//! - **`Validate` trait**: implemented by domain payloads; a directory
//!   validates its create input through it before any state changes
//! - **Error Handling**: field-level error tracking with nested field paths
//!   (e.g. `destination.name`) and multiple errors per field
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use signpost_core::validation::{
//!     validate_field, Required, MaxLength, Validate, ValidationErrors, ValidationResult,
//! };
//!
//! struct CreatePlace {
//!     name: String,
//! }
//!
//! impl Validate for CreatePlace {
//!     fn validate(&self) -> ValidationResult {
//!         let mut errors = ValidationErrors::new();
//!         validate_field(&mut errors, "name", &self.name, &[&Required, &MaxLength(128)]);
//!         errors.into_result()
//!     }
//! }
//! ```

mod error;
mod rules;

pub use error::{FieldError, ValidationErrorKind, ValidationErrors};
pub use rules::{MaxLength, MinLength, Required, RequiredString, ValidationRule};

/// Result of validating a value: `Ok(())` or the collected field errors.
pub type ValidationResult = std::result::Result<(), ValidationErrors>;

/// Trait for payloads that can be validated synchronously.
pub trait Validate {
    /// Validate the value and return any errors.
    fn validate(&self) -> ValidationResult;
}

/// Apply a set of rules to a single field, collecting any errors.
pub fn validate_field<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: &T,
    rules: &[&dyn ValidationRule<T>],
) {
    for rule in rules {
        if let Some(error) = rule.validate(value) {
            errors.add(field, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Request {
        name: String,
        note: Option<String>,
    }

    impl Validate for Request {
        fn validate(&self) -> ValidationResult {
            let mut errors = ValidationErrors::new();
            validate_field(&mut errors, "name", &self.name, &[&Required, &MaxLength(16)]);
            validate_field(&mut errors, "note", &self.note, &[&RequiredString]);
            errors.into_result()
        }
    }

    #[test]
    fn test_validate_collects_all_field_errors() {
        let request = Request {
            name: String::new(),
            note: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_count(), 2);
        assert!(errors.has_errors("name"));
        assert!(errors.has_errors("note"));
    }

    #[test]
    fn test_validate_passes_for_valid_input() {
        let request = Request {
            name: "home".to_string(),
            note: Some("weekday commute".to_string()),
        };

        assert!(request.validate().is_ok());
    }
}
