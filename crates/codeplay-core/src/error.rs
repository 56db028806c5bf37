//! Error types for the Codeplay online compiler core.
//!
//! Judged outcomes (compile errors, runtime errors, empty output) and
//! transport failures are not errors here: they are values of
//! [`SubmissionResult`](crate::SubmissionResult). This module only covers
//! programmer, configuration and user-sequencing mistakes.

use std::path::PathBuf;

/// A specialized `Result` type for Codeplay core operations.
pub type Result<T> = std::result::Result<T, CodeplayError>;

/// Errors that can occur while configuring or driving an editor session.
#[derive(Debug, thiserror::Error)]
pub enum CodeplayError {
    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// The requested language is not part of the catalog.
    #[error("Unknown language: '{service_id}'\n\nSuggestion: Pick one of the languages listed by the registry")]
    UnknownLanguage {
        /// The service identifier that was looked up.
        service_id: String,
    },

    /// The language catalog and the default source table disagree.
    #[error("Language catalog is inconsistent: {message}\n\nSuggestion: Every catalog entry needs exactly one default snippet and a numeric service id")]
    CatalogMismatch {
        /// Description of the violated invariant.
        message: String,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A submission is already in flight for this session.
    #[error("A submission is already running\n\nSuggestion: Wait for the current run to finish")]
    AlreadySubmitting,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your codeplay.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodeplayError {
    /// Creates a new `UnknownLanguage` error.
    #[must_use]
    pub fn unknown_language(service_id: impl Into<String>) -> Self {
        Self::UnknownLanguage {
            service_id: service_id.into(),
        }
    }

    /// Creates a new `CatalogMismatch` error.
    #[must_use]
    pub fn catalog_mismatch(message: impl Into<String>) -> Self {
        Self::CatalogMismatch {
            message: message.into(),
        }
    }

    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Returns `true` if this error means the process was started with a
    /// broken catalog or configuration and should not continue.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CatalogMismatch { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
        )
    }

    /// Returns `true` if the user can simply try again later.
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::AlreadySubmitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_display() {
        let err = CodeplayError::unknown_language("999");
        let msg = err.to_string();
        assert!(msg.contains("Unknown language"));
        assert!(msg.contains("999"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_catalog_mismatch_display() {
        let err = CodeplayError::catalog_mismatch("'71' has no default source");
        assert!(err.to_string().contains("'71' has no default source"));
    }

    #[test]
    fn test_is_fatal() {
        assert!(CodeplayError::catalog_mismatch("dup").is_fatal());
        assert!(CodeplayError::config_validation("bad", "fix it").is_fatal());
        assert!(CodeplayError::config_parse("/x/codeplay.json", "eof").is_fatal());

        assert!(!CodeplayError::AlreadySubmitting.is_fatal());
        assert!(!CodeplayError::unknown_language("1").is_fatal());
    }

    #[test]
    fn test_is_user_recoverable() {
        assert!(CodeplayError::AlreadySubmitting.is_user_recoverable());
        assert!(!CodeplayError::unknown_language("1").is_user_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CodeplayError = io_err.into();
        assert!(matches!(err, CodeplayError::Io(_)));
    }
}
