//! CLI error types

use authprobe_core::{CheckError, FailureKind};
use thiserror::Error;

/// Exit status for a run that failed its checks
pub const EXIT_CHECK_FAILED: i32 = 1;
/// Exit status for usage and configuration mistakes
pub const EXIT_USAGE: i32 = 2;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CliError {
    /// Get error code for this error type
    ///
    /// Check failures keep the code of the underlying `CheckError`.
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Check(e) => e.code(),
            CliError::SerializationError(_) => "CLI001",
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Check(
                CheckError::ConfigurationError(_) | CheckError::ValidationError(_),
            ) => EXIT_USAGE,
            _ => EXIT_CHECK_FAILED,
        }
    }

    /// Failure classification, when the error came from the check itself
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CliError::Check(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// CLI-specific result type
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn serialization_error() -> CliError {
        serde_json::from_str::<serde_json::Value>("{")
            .expect_err("truncated JSON")
            .into()
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(serialization_error().code(), "CLI001");
        let timeout = CliError::from(CheckError::ReadinessTimeout {
            target: "port 8080".to_string(),
            waited: Duration::from_secs(1),
        });
        assert_eq!(timeout.code(), "CHECK001");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(CheckError::ConfigurationError("missing file".to_string()))
                .exit_code(),
            EXIT_USAGE
        );
        assert_eq!(
            CliError::from(CheckError::ValidationError("port: must be 1..=65535".to_string()))
                .exit_code(),
            EXIT_USAGE
        );
        assert_eq!(
            CliError::from(CheckError::ProcessError("spawn".to_string())).exit_code(),
            EXIT_CHECK_FAILED
        );
        assert_eq!(serialization_error().exit_code(), EXIT_CHECK_FAILED);
    }

    #[test]
    fn test_error_display() {
        let error = serialization_error();
        assert!(error.to_string().starts_with("Serialization error:"), "{error}");
        assert_eq!(error.failure_kind(), None);

        let check = CliError::from(CheckError::ProcessError("timed out".to_string()));
        assert_eq!(check.to_string(), "Process error: timed out");
        assert_eq!(check.failure_kind(), Some(FailureKind::Infrastructure));
    }
}
