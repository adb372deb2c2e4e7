//! Error types for the CLI.

use thiserror::Error;

/// Main error type for CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Document failed boundary validation.
    #[error("Validation failed: {0}")]
    Payload(#[from] annexiv_engine::PayloadError),

    /// One or more deny violations.
    #[error("Validation failed with {violations} violation(s)")]
    ValidationFailed { violations: usize },

    /// Engine error (e.g. writing the SARIF report).
    #[error(transparent)]
    Engine(#[from] annexiv_engine::EngineError),

    /// Store access failed.
    #[error("Store error: {0}")]
    Store(#[from] annexiv_store::StoreError),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_display() {
        let err = CliError::ValidationFailed { violations: 3 };
        assert_eq!(err.to_string(), "Validation failed with 3 violation(s)");
    }

    #[test]
    fn test_not_found_display() {
        let err: CliError =
            annexiv_store::StoreError::RegulationNotFound("32024R1689".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Store error: regulation not found: 32024R1689"
        );
    }
}
