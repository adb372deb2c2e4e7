//! Error types for the Annex IV engine

use thiserror::Error;

use crate::section::SectionKey;

/// Failure while reconstructing section text from source rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// More than one parent row for the same section
    #[error("Duplicate parent rows for section {key}: '{first}' and '{second}'")]
    DuplicateParent {
        key: SectionKey,
        first: String,
        second: String,
    },
}

/// Boundary validation failure for a user-supplied document
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Document could not be parsed as YAML
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Top-level node is not a mapping
    #[error("Document root must be a mapping of section keys, found {0}")]
    NotAMapping(&'static str),

    /// A classification field has the wrong type or value
    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: String,
    },

    /// Tags outside the Annex III vocabulary
    #[error("Unknown use_case(s): {}. Allowed: {}", .unknown.join(", "), .allowed.join(", "))]
    UnknownUseCase {
        unknown: Vec<String>,
        allowed: Vec<String>,
    },
}

/// Coordinate-preserving parse failure
#[derive(Error, Debug)]
pub enum SourceError {
    /// Scanner or parser error with its location
    #[error("YAML scan error: {0}")]
    Scan(#[from] yaml_rust2::scanner::ScanError),

    /// Input contained no document
    #[error("Document is empty")]
    Empty,
}

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Section assembly failed
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Payload failed boundary validation
    #[error("Payload validation failed: {0}")]
    Payload(#[from] PayloadError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_parent_display() {
        let err = AssemblyError::DuplicateParent {
            key: SectionKey::RiskManagement,
            first: "AnnexIV.5".to_string(),
            second: "annexiv.5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate parent rows for section risk_management: 'AnnexIV.5' and 'annexiv.5'"
        );
    }

    #[test]
    fn test_unknown_use_case_display() {
        let err = PayloadError::UnknownUseCase {
            unknown: vec!["toys".to_string()],
            allowed: vec!["biometric_id".to_string(), "law_enforcement".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown use_case(s): toys. Allowed: biometric_id, law_enforcement"
        );
    }

    #[test]
    fn test_engine_error_wraps_payload() {
        let err: EngineError = PayloadError::NotAMapping("a sequence").into();
        assert!(err.to_string().contains("a sequence"));
    }
}
