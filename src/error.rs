//! Error handling for Signpost Core.
//!
//! This module provides:
//! - Structured error codes for machine-readable consumer handling
//! - User-friendly messages vs detailed internal messages
//! - Field-level validation error attachment
//! - Error logging with tracing integration
//! - Metrics integration for error tracking
//!
//! The outer transport layer (out of scope here) maps [`ErrorCode`] values to
//! whatever status codes its protocol uses.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::validation::ValidationErrors;

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Signpost operations.
pub type Result<T> = std::result::Result<T, SignpostError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
///
/// These codes are stable and can be used by consumers for programmatic error
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Directory Errors (1000-1099)
    ElementNotFound,
    DuplicateElement,
    ResourceNotFound,
    AlreadyRegistered,

    // Serialization Errors (2200-2299)
    SerializationError,

    // External Provider Errors (3000-3099)
    ProviderError,
    ProviderTimeout,
    ProviderUnavailable,
    NetworkError,

    // Validation Errors (4100-4199)
    ValidationError,
    InvalidArgument,
    MissingRequiredField,

    // Configuration Errors (5000-5099)
    ConfigurationError,
    MissingConfiguration,

    // Internal Errors (9000-9099)
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            // Directory Errors
            Self::ElementNotFound => 1000,
            Self::DuplicateElement => 1001,
            Self::ResourceNotFound => 1002,
            Self::AlreadyRegistered => 1003,

            // Serialization Errors
            Self::SerializationError => 2200,

            // External Provider Errors
            Self::ProviderError => 3000,
            Self::ProviderTimeout => 3001,
            Self::ProviderUnavailable => 3002,
            Self::NetworkError => 3003,

            // Validation Errors
            Self::ValidationError => 4100,
            Self::InvalidArgument => 4101,
            Self::MissingRequiredField => 4102,

            // Configuration Errors
            Self::ConfigurationError => 5000,
            Self::MissingConfiguration => 5001,

            // Internal Errors
            Self::InternalError => 9000,
        }
    }

    /// Check if this error is retryable.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderTimeout | Self::ProviderUnavailable | Self::NetworkError
        )
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "directory",
            2200..=2299 => "serialization",
            3000..=3099 => "provider",
            4100..=4199 => "validation",
            5000..=5099 => "configuration",
            9000..=9099 => "internal",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Caller errors (bad input, unknown ids)
    Low,
    /// Operational issues (provider timeouts, unavailability)
    Medium,
    /// System errors (provider rejections, serialization failures)
    High,
    /// Critical errors requiring immediate attention
    Critical,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::ElementNotFound
            | ErrorCode::DuplicateElement
            | ErrorCode::ResourceNotFound
            | ErrorCode::AlreadyRegistered
            | ErrorCode::ValidationError
            | ErrorCode::InvalidArgument
            | ErrorCode::MissingRequiredField => Self::Low,

            ErrorCode::ProviderTimeout | ErrorCode::ProviderUnavailable => Self::Medium,

            ErrorCode::ProviderError
            | ErrorCode::NetworkError
            | ErrorCode::SerializationError
            | ErrorCode::ConfigurationError
            | ErrorCode::MissingConfiguration => Self::High,

            ErrorCode::InternalError => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Signpost Core.
///
/// Supports structured error codes, user-friendly vs internal messages,
/// attached field-level validation errors, and error chaining.
#[derive(Error, Debug)]
#[error("[{code}] {user_message}")]
pub struct SignpostError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-friendly error message (safe to expose to clients)
    user_message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// Field-level validation errors, when the error came from validation
    fields: Option<ValidationErrors>,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SignpostError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and user message.
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            fields: None,
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, user_message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(
            ErrorCode::InternalError,
            "An internal error occurred",
            message,
        )
    }

    /// Create an element not found error.
    pub fn element_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ElementNotFound,
            format!("Element not found: {}", id),
        )
    }

    /// Create a duplicate element error.
    pub fn duplicate_element(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DuplicateElement,
            format!("Element already exists: {}", id),
        )
    }

    /// Create a resource not found error.
    pub fn resource_not_found(name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("Resource not found: {}", name),
        )
    }

    /// Create an already registered error.
    pub fn already_registered(name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AlreadyRegistered,
            format!("Resource already registered: {}", name),
        )
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Create a validation error carrying field-level errors.
    pub fn validation(errors: ValidationErrors) -> Self {
        let code = if errors.has_missing_fields() {
            ErrorCode::MissingRequiredField
        } else {
            ErrorCode::ValidationError
        };
        let mut error = Self::new(code, errors.to_string());
        error.fields = Some(errors);
        error
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ProviderError, message)
    }

    /// Create a provider timeout error.
    pub fn provider_timeout(timeout: Duration) -> Self {
        Self::new(
            ErrorCode::ProviderTimeout,
            format!("Provider call timed out after {:?}", timeout),
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add an internal message.
    pub fn with_internal_message(mut self, message: impl Into<String>) -> Self {
        self.internal_message = Some(message.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the user-friendly message.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Get the internal message (if any).
    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    /// Get attached field-level validation errors (if any).
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        self.fields.as_ref()
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        match self.severity() {
            ErrorSeverity::Critical => {
                error!(
                    error_code = %code,
                    category = category,
                    user_message = %self.user_message,
                    internal_message = ?self.internal_message,
                    source = ?self.source,
                    "CRITICAL ERROR"
                );
            }
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    user_message = %self.user_message,
                    internal_message = ?self.internal_message,
                    "High severity error"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    user_message = %self.user_message,
                    "Medium severity error"
                );
            }
            ErrorSeverity::Low => {
                debug!(
                    error_code = %code,
                    category = category,
                    user_message = %self.user_message,
                    "Low severity error"
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Metrics
    // ─────────────────────────────────────────────────────────────────────────

    /// Record error metrics.
    fn record_metrics(&self) {
        counter!(
            "signpost_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
            "retryable" => self.code.is_retryable().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Context Extension Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with an error code.
    fn with_error_code(self, code: ErrorCode) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| SignpostError::internal(message.into()).with_source(e))
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| SignpostError::new(code, e.to_string()).with_source(e))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SignpostError::new(ErrorCode::ResourceNotFound, message.into()))
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.ok_or_else(|| SignpostError::new(code, "Resource not found"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<ValidationErrors> for SignpostError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<serde_json::Error> for SignpostError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_internal(
            ErrorCode::SerializationError,
            "Failed to process JSON data",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<reqwest::Error> for SignpostError {
    fn from(error: reqwest::Error) -> Self {
        let (code, user_msg) = if error.is_timeout() {
            (ErrorCode::ProviderTimeout, "Provider request timed out")
        } else if error.is_connect() {
            (ErrorCode::NetworkError, "Failed to connect to provider")
        } else if error.is_status() {
            match error.status().map(|s| s.as_u16()) {
                Some(500..=599) => (
                    ErrorCode::ProviderUnavailable,
                    "Provider is temporarily unavailable",
                ),
                _ => (ErrorCode::ProviderError, "Provider returned an error"),
            }
        } else {
            (ErrorCode::NetworkError, "Network error occurred")
        };

        Self::with_internal(code, user_msg, error.to_string()).with_source(error)
    }
}

impl From<tokio::time::error::Elapsed> for SignpostError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        Self::with_internal(
            ErrorCode::ProviderTimeout,
            "Operation timed out",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<config::ConfigError> for SignpostError {
    fn from(error: config::ConfigError) -> Self {
        let (code, user_msg) = match &error {
            config::ConfigError::NotFound(_) => (
                ErrorCode::MissingConfiguration,
                "Required configuration not found",
            ),
            _ => (
                ErrorCode::ConfigurationError,
                "Configuration error occurred",
            ),
        };

        Self::with_internal(code, user_msg, error.to_string())
    }
}

impl From<anyhow::Error> for SignpostError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<SignpostError>() {
            Ok(signpost_error) => signpost_error,
            Err(error) => Self::with_internal(
                ErrorCode::InternalError,
                "An internal error occurred",
                error.to_string(),
            ),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
