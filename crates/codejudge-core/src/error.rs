//! Error types and exit codes for codejudge
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (judge output rejected, invocation exhausted, IO)
//! - 2: Usage error (bad flags/args, invalid configuration)
//! - 3: Data error (missing rubric/session/results, path escapes its root)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for codejudge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing inputs, rejected paths (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while judging, collecting, or reporting
#[derive(Error, Debug)]
pub enum JudgeError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("path {path:?} escapes allowed root {root:?}")]
    Security { path: PathBuf, root: PathBuf },

    // Generic failures (exit code 1)
    #[error("invalid score: {field}: {reason}")]
    InvalidScore { field: String, reason: String },

    #[error("could not parse judge response: {reason}")]
    ResponseParse { reason: String },

    #[error("judge invocation failed after {attempts} attempt(s): {last_error}")]
    InvocationExhausted { attempts: u32, last_error: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("interrupted before all judging calls were scheduled")]
    Interrupted,

    #[error("{0}")]
    Other(String),
}

impl JudgeError {
    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        JudgeError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        JudgeError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a score, verdict or category outside its domain
    pub fn invalid_score(field: &str, reason: impl std::fmt::Display) -> Self {
        JudgeError::InvalidScore {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for judge output that is not JSON
    pub fn response_parse(reason: impl std::fmt::Display) -> Self {
        JudgeError::ResponseParse {
            reason: reason.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        JudgeError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            JudgeError::UnknownFormat(_)
            | JudgeError::UsageError(_)
            | JudgeError::InvalidValue { .. } => ExitCode::Usage,

            JudgeError::NotFound { .. } | JudgeError::Security { .. } => ExitCode::Data,

            JudgeError::InvalidScore { .. }
            | JudgeError::ResponseParse { .. }
            | JudgeError::InvocationExhausted { .. }
            | JudgeError::Io(_)
            | JudgeError::Json(_)
            | JudgeError::Yaml(_)
            | JudgeError::Toml(_)
            | JudgeError::FailedOperationWithTarget { .. }
            | JudgeError::Interrupted
            | JudgeError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            JudgeError::UnknownFormat(_) => "unknown_format",
            JudgeError::UsageError(_) => "usage_error",
            JudgeError::InvalidValue { .. } => "invalid_value",
            JudgeError::NotFound { .. } => "not_found",
            JudgeError::Security { .. } => "security_error",
            JudgeError::InvalidScore { .. } => "invalid_score",
            JudgeError::ResponseParse { .. } => "response_parse_error",
            JudgeError::InvocationExhausted { .. } => "invocation_exhausted",
            JudgeError::Io(_) => "io_error",
            JudgeError::Json(_) => "json_error",
            JudgeError::Yaml(_) => "yaml_error",
            JudgeError::Toml(_) => "toml_error",
            JudgeError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            JudgeError::Interrupted => "interrupted",
            JudgeError::Other(_) => "other",
        }
    }

    /// Whether a batch should keep going after this error.
    ///
    /// Every per-call error is local to its call; only an interrupt stops
    /// the batch from scheduling further work.
    pub fn is_call_local(&self) -> bool {
        !matches!(self, JudgeError::Interrupted)
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for codejudge operations
pub type Result<T> = std::result::Result<T, JudgeError>;
