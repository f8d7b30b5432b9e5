//! CLI-specific error types
//!
//! All CLI errors are fatal: the process prints the error and exits
//! non-zero. Failed reads and writes inside a session are not CLI errors;
//! they are reported as JSON error lines.

use std::fmt;
use std::io;

use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Command line could not be parsed
    InvalidCommand,
    /// A request thread panicked
    WorkerPanicked,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RWSTORE_CLI_CONFIG_ERROR",
            Self::IoError => "RWSTORE_CLI_IO_ERROR",
            Self::InvalidCommand => "RWSTORE_CLI_INVALID_COMMAND",
            Self::WorkerPanicked => "RWSTORE_CLI_WORKER_PANICKED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Unparseable shell command
    pub fn invalid_command(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidCommand, msg)
    }

    /// Request thread panicked
    pub fn worker_panicked() -> Self {
        Self::new(CliErrorCode::WorkerPanicked, "Request thread panicked")
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::invalid_command("Unknown command: foo");
        assert_eq!(
            err.to_string(),
            "RWSTORE_CLI_INVALID_COMMAND: Unknown command: foo"
        );
        assert_eq!(err.code(), &CliErrorCode::InvalidCommand);
    }

    #[test]
    fn test_from_config_error() {
        let err: CliError = ConfigError::Invalid {
            field: "max_records",
            reason: "must be > 0 when set",
        }
        .into();
        assert_eq!(err.code_str(), "RWSTORE_CLI_CONFIG_ERROR");
        assert!(err.message().contains("max_records"));
    }
}
