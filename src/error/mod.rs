//! Error handling for treeguard.
//!
//! This module provides:
//! - [`TgError`]: The main error enum for all operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestion and context

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for treeguard operations.
#[derive(Error, Debug)]
pub enum TgError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Documentation not found: {0}")]
    DocumentationNotFound(String),

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    #[error("Invalid class name: {0:?}")]
    InvalidClassName(String),

    #[error("Skill is not in the catalog: {0}")]
    UnknownSkill(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Failed to {operation}: {reason}")]
    OperationFailed { operation: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl TgError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::DocumentationNotFound(_) => ErrorCode::DocumentationNotFound,
            Self::ClassNotFound(_) => ErrorCode::ClassNotFound,
            Self::ActivityNotFound(_) => ErrorCode::ActivityNotFound,
            Self::InvalidClassName(_) => ErrorCode::ClassNameInvalid,
            Self::UnknownSkill(_) => ErrorCode::SkillUnknown,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::TransactionFailed(_) => ErrorCode::TransactionFailed,
            Self::OperationFailed { .. } => ErrorCode::StoreOperationFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::DocumentationNotFound(id) => Some(serde_json::json!({ "documentation_id": id })),
            Self::ClassNotFound(name) => Some(serde_json::json!({ "class": name })),
            Self::ActivityNotFound(id) => Some(serde_json::json!({ "activity_id": id })),
            Self::InvalidClassName(raw) => Some(serde_json::json!({ "class": raw })),
            Self::UnknownSkill(name) => Some(serde_json::json!({ "skill": name })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            Self::OperationFailed { operation, reason } => {
                Some(serde_json::json!({ "operation": operation, "reason": reason }))
            }
            _ => None,
        }
    }

    /// True for the "record is absent" family of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DocumentationNotFound(_)
                | Self::ClassNotFound(_)
                | Self::ActivityNotFound(_)
                | Self::NotFound(_)
        )
    }

    /// Collapse store-level failures into a generic [`TgError::OperationFailed`].
    ///
    /// Absent-record and validation errors pass through so callers can still
    /// tell them apart.
    #[must_use]
    pub fn into_operation_failure(self, operation: &str) -> Self {
        match self {
            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::TransactionFailed(_) => {
                Self::OperationFailed {
                    operation: operation.to_string(),
                    reason: self.to_string(),
                }
            }
            other => other,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_tg_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "CLASS_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "class", "storage")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`TgError`].
    #[must_use]
    pub fn from_tg_error(err: &TgError) -> Self {
        let mut structured = Self::new(err.code(), err.to_string());
        structured.context = err.context();
        structured
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<TgError> for StructuredError {
    fn from(err: TgError) -> Self {
        Self::from_tg_error(&err)
    }
}

impl From<&TgError> for StructuredError {
    fn from(err: &TgError) -> Self {
        Self::from_tg_error(err)
    }
}

/// Result type alias using TgError.
pub type Result<T> = std::result::Result<T, TgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tg_error_code_mapping() {
        assert_eq!(
            TgError::DocumentationNotFound("x".into()).code(),
            ErrorCode::DocumentationNotFound
        );
        assert_eq!(TgError::Config("bad".into()).code(), ErrorCode::ConfigInvalid);
        assert_eq!(
            TgError::InvalidClassName(String::new()).code(),
            ErrorCode::ClassNameInvalid
        );
    }

    #[test]
    fn test_tg_error_context() {
        let err = TgError::ClassNotFound("C2".into());
        let ctx = err.context().unwrap();
        assert_eq!(ctx.get("class").unwrap(), "C2");
    }

    #[test]
    fn test_operation_failure_wraps_store_errors() {
        let err = TgError::Database(rusqlite::Error::QueryReturnedNoRows)
            .into_operation_failure("add documentation");
        assert_eq!(err.code(), ErrorCode::StoreOperationFailed);
        assert!(err.to_string().starts_with("Failed to add documentation"));
    }

    #[test]
    fn test_operation_failure_keeps_not_found() {
        let err = TgError::DocumentationNotFound("abc".into())
            .into_operation_failure("delete documentation");
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::DocumentationNotFound);
    }

    #[test]
    fn test_structured_error_from_tg_error() {
        let err = TgError::UnknownSkill("גישוש".into());
        let structured = StructuredError::from_tg_error(&err);

        assert_eq!(structured.code, ErrorCode::SkillUnknown);
        assert_eq!(structured.numeric_code, 401);
        assert!(structured.message.contains("גישוש"));
        assert!(structured.recoverable);
        assert_eq!(structured.category, "skill");
        assert_eq!(structured.context.unwrap()["skill"], "גישוש");
    }

    #[test]
    fn test_structured_error_serialization() {
        let err = StructuredError::new(ErrorCode::ClassNotFound, "Class 'C2' not found");
        let json = serde_json::to_string(&err).unwrap();

        assert!(json.contains("CLASS_NOT_FOUND"));
        assert!(json.contains("\"numeric_code\":101"));
        assert!(json.contains("\"category\":\"class\""));
    }

    #[test]
    fn test_structured_error_display() {
        let err = StructuredError::new(ErrorCode::ClassNotFound, "Class 'C2' not found");
        let display = format!("{err}");
        assert!(display.contains("E101"));
        assert!(display.contains("C2"));
    }
}
