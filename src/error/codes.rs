//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Class errors
//! - 2xx: Documentation errors
//! - 3xx: Config errors
//! - 4xx: Skill errors
//! - 5xx: Activity errors
//! - 6xx: Storage errors
//! - 8xx: Validation errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ClassNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Class errors (1xx)
    // ========================================
    /// E101: No aggregate stored for the class
    ClassNotFound,
    /// E102: Class identifier could not be normalized
    ClassNameInvalid,

    // ========================================
    // Documentation errors (2xx)
    // ========================================
    /// E201: Documentation entry does not exist
    DocumentationNotFound,
    /// E202: Documentation entry failed validation
    DocumentationInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file not found
    ConfigNotFound,
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Skill errors (4xx)
    // ========================================
    /// E401: Skill tag is outside the fixed catalog and the policy rejects it
    SkillUnknown,

    // ========================================
    // Activity errors (5xx)
    // ========================================
    /// E501: Activity does not exist
    ActivityNotFound,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,
    /// E606: A store call failed inside a synchronizer operation
    StoreOperationFailed,
    /// E607: Transaction could not be committed
    TransactionFailed,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Validation rules failed
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E905: Generic not found (catch-all)
    NotFound,
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `ClassNotFound` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ClassNotFound => 101,
            Self::ClassNameInvalid => 102,

            Self::DocumentationNotFound => 201,
            Self::DocumentationInvalid => 202,

            Self::ConfigNotFound => 301,
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::SkillUnknown => 401,

            Self::ActivityNotFound => 501,

            Self::DatabaseError => 604,
            Self::SerializationError => 605,
            Self::StoreOperationFailed => 606,
            Self::TransactionFailed => 607,

            Self::ValidationFailed => 801,

            Self::InternalError => 901,
            Self::NotFound => 905,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ClassNotFound => "Run `tg class list` to see stored classes, or `tg class show <name>` to create one",
            Self::ClassNameInvalid => "Use a grade letter and a number, e.g. ג2, 2ג or C2",
            Self::DocumentationNotFound => "Run `tg doc list` to find the documentation id",
            Self::DocumentationInvalid => "Check the documentation fields (class, title, date) and retry",
            Self::ConfigNotFound => "Create a config.toml under the treeguard root, or pass --config <path>",
            Self::ConfigInvalid => "Run `tg config` to see current values. Check TOML syntax in config file",
            Self::ConfigMissingRequired => "Set the required value in config.toml or through a TG_* environment variable",
            Self::SkillUnknown => "Run `tg skill list` for the catalog, or set skills.policy = \"promote\" to accept new tags",
            Self::ActivityNotFound => "Run `tg activity list` to find the activity id",
            Self::DatabaseError => "Check that the database file is readable. `tg resync` rebuilds class aggregates",
            Self::SerializationError => "The stored record may be corrupted. Check input data for validity",
            Self::StoreOperationFailed => "The store rejected the operation and nothing was written. Retry the command",
            Self::TransactionFailed => "The operation was rolled back. Check error details and retry",
            Self::ValidationFailed => "Review the validation errors and fix each issue",
            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::NotFound => "The requested resource was not found. Check the identifier",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ClassNotFound
            | Self::ClassNameInvalid
            | Self::DocumentationNotFound
            | Self::DocumentationInvalid
            | Self::ConfigNotFound
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::SkillUnknown
            | Self::ActivityNotFound
            | Self::StoreOperationFailed
            | Self::TransactionFailed
            | Self::ValidationFailed
            | Self::NotFound
            | Self::IoError => true,

            Self::DatabaseError | Self::SerializationError | Self::InternalError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "class",
            2 => "documentation",
            3 => "config",
            4 => "skill",
            5 => "activity",
            6 => "storage",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ClassNotFound,
            Self::ClassNameInvalid,
            Self::DocumentationNotFound,
            Self::DocumentationInvalid,
            Self::ConfigNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SkillUnknown,
            Self::ActivityNotFound,
            Self::DatabaseError,
            Self::SerializationError,
            Self::StoreOperationFailed,
            Self::TransactionFailed,
            Self::ValidationFailed,
            Self::InternalError,
            Self::NotFound,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::ClassNotFound.numeric(), 101);
        assert_eq!(ErrorCode::DocumentationNotFound.numeric(), 201);
        assert_eq!(ErrorCode::ConfigNotFound.numeric(), 301);
        assert_eq!(ErrorCode::SkillUnknown.numeric(), 401);
        assert_eq!(ErrorCode::ActivityNotFound.numeric(), 501);
        assert_eq!(ErrorCode::DatabaseError.numeric(), 604);
        assert_eq!(ErrorCode::ValidationFailed.numeric(), 801);
        assert_eq!(ErrorCode::InternalError.numeric(), 901);
    }

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::ClassNotFound.code_string(), "E101");
        assert_eq!(ErrorCode::StoreOperationFailed.code_string(), "E606");
    }

    #[test]
    fn test_all_codes_have_suggestions_and_categories() {
        for code in ErrorCode::all() {
            assert!(!code.suggestion().is_empty(), "{code:?} has empty suggestion");
            assert_ne!(code.category(), "unknown", "{code:?} has invalid category");
        }
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::DocumentationNotFound).unwrap();
        assert_eq!(json, "\"DOCUMENTATION_NOT_FOUND\"");

        let deserialized: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, ErrorCode::DocumentationNotFound);
    }

    #[test]
    fn test_category_assignment() {
        assert_eq!(ErrorCode::ClassNameInvalid.category(), "class");
        assert_eq!(ErrorCode::DocumentationInvalid.category(), "documentation");
        assert_eq!(ErrorCode::SkillUnknown.category(), "skill");
        assert_eq!(ErrorCode::ActivityNotFound.category(), "activity");
        assert_eq!(ErrorCode::TransactionFailed.category(), "storage");
    }

    #[test]
    fn test_no_duplicate_numeric_codes() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            assert!(seen.insert(code.numeric()), "Duplicate numeric code: {}", code.numeric());
        }
    }
}
