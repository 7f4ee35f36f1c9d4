//! Structured error reporting and exit codes.

use serde::Serialize;

use crate::http::ApiError;

/// Exit codes for the coachdash application.
///
/// - 0: Success
/// - 1: General error (configuration, I/O, rejected or failed API call)
/// - 2: Redirected to login (no session, wrong role, or session expired)
/// - 3: Degraded (screen rendered, but some data sources fell back to defaults)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed normally.
    Success = 0,
    /// General error: an unexpected or reported failure.
    GeneralError = 1,
    /// The requested screen redirected to the login screen.
    LoginRequired = 2,
    /// The screen loaded with one or more degraded data sources.
    Degraded = 3,
    /// Interrupted: the command was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CD000",
            Self::GeneralError => "CD001",
            Self::LoginRequired => "CD002",
            Self::Degraded => "CD003",
            Self::Interrupted => "CD130",
        }
    }

    /// Pick the exit code for a failed API call.
    ///
    /// Authorization failures send the user back to login, everything else
    /// is terminal for the action and reported as a general error.
    #[must_use]
    pub fn for_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthorized { .. } | ApiError::NotAuthenticated => Self::LoginRequired,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self::from_message(err.to_string(), exit_code)
    }

    /// Create a structured error from a user-facing notice.
    #[must_use]
    pub fn from_message(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: message.into(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::LoginRequired.as_i32(), 2);
        assert_eq!(ExitCode::Degraded.as_i32(), 3);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_exit_code_for_api_errors() {
        let expired = ApiError::Unauthorized { detail: None };
        assert_eq!(ExitCode::for_api_error(&expired), ExitCode::LoginRequired);
        assert_eq!(
            ExitCode::for_api_error(&ApiError::NotAuthenticated),
            ExitCode::LoginRequired
        );
        let rejected = ApiError::Rejected {
            status: 400,
            detail: Some("Registration code already exists".into()),
        };
        assert_eq!(ExitCode::for_api_error(&rejected), ExitCode::GeneralError);
    }

    #[test]
    fn test_structured_error_from_message() {
        let err = StructuredError::from_message("boom", ExitCode::Interrupted);
        assert_eq!(err.code, "CD130");
        assert_eq!(err.exit_code, 130);
        assert!(err.interrupted);
    }
}
