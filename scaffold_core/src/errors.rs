//! # Error Types
//!
//! Structured error types for scaffold_core. Every failure carries enough
//! context (field name, offending value, catalog table) for a caller to turn
//! it into form feedback or a deployment diagnostic without parsing strings.
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::errors::{CalcError, CalcResult};
//!
//! fn validate_height(height_m: f64) -> CalcResult<()> {
//!     if height_m <= 0.0 {
//!         return Err(CalcError::validation(
//!             "height_m",
//!             height_m.to_string(),
//!             "Height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_height(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for scaffold_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation, catalog, and storage operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input field is malformed or out of range
    #[error("Invalid value for '{field}': {value} - {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A frame size, platform length, or system key is not in the catalog
    #[error("Unknown {table} key: '{key}'")]
    UnknownCatalogKey { table: String, key: String },

    /// Catalog data failed validation while loading
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    /// A unique value was submitted twice
    #[error("Duplicate {field}: '{value}' is already registered")]
    DuplicateEntry { field: String, value: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (report rendering, worker failures)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a ValidationError
    pub fn validation(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ValidationError {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownCatalogKey error
    pub fn unknown_key(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::UnknownCatalogKey {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create an InvalidCatalog error
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        CalcError::InvalidCatalog {
            reason: reason.into(),
        }
    }

    /// Create a DuplicateEntry error
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CalcError::DuplicateEntry {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// True for errors caused by the caller's input rather than the system.
    ///
    /// Frontends surface these as form feedback; everything else is a
    /// deployment or storage defect.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CalcError::ValidationError { .. }
                | CalcError::MissingField { .. }
                | CalcError::UnknownCatalogKey { .. }
                | CalcError::DuplicateEntry { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::ValidationError { .. } => "VALIDATION_ERROR",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownCatalogKey { .. } => "UNKNOWN_CATALOG_KEY",
            CalcError::InvalidCatalog { .. } => "INVALID_CATALOG",
            CalcError::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::validation("height_m", "-3", "Height must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"ValidationError\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("sides").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::unknown_key("frame size", "mason-frame-999x999").error_code(),
            "UNKNOWN_CATALOG_KEY"
        );
        assert_eq!(CalcError::duplicate("email", "a@b.co").error_code(), "DUPLICATE_ENTRY");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(CalcError::validation("area_m2", "0", "must be positive").is_client_error());
        assert!(CalcError::unknown_key("platform length", "platform-1").is_client_error());
        assert!(!CalcError::internal("boom").is_client_error());
        assert!(!CalcError::file_error("open", "/tmp/x", "denied").is_client_error());
    }

    #[test]
    fn test_unknown_key_message() {
        let err = CalcError::unknown_key("frame size", "mason-frame-999x999");
        assert_eq!(err.to_string(), "Unknown frame size key: 'mason-frame-999x999'");
    }
}
