//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sfa_config::ConfigError;
use sfa_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the engine at {endpoint}: {reason}")]
    #[diagnostic(
        code(sfa::connection_failed),
        help(
            "Check that the sing-box service is running.\n\
             Endpoint: {endpoint}\n\
             Override with --endpoint or SFA_ENDPOINT."
        )
    )]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Invalid engine endpoint '{endpoint}': {reason}")]
    #[diagnostic(
        code(sfa::invalid_endpoint),
        help("Use unix:<path>, an absolute socket path, or tcp:<host>:<port>.")
    )]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Engine session ended: {reason}")]
    #[diagnostic(code(sfa::session_closed))]
    SessionClosed { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sfa::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists")]
    #[diagnostic(
        code(sfa::config_exists),
        help("Pass --force to overwrite it.\nPath: {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(sfa::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(sfa::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(sfa::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::SessionClosed { .. } => exit_code::CONNECTION,
            Self::InvalidEndpoint { .. }
            | Self::Validation { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::InvalidEndpoint { endpoint, reason } => {
                Self::InvalidEndpoint { endpoint, reason }
            }
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { endpoint, reason } => {
                Self::ConnectionFailed { endpoint, reason }
            }
            CoreError::SessionClosed { reason } => Self::SessionClosed { reason },
            CoreError::InvalidEndpoint { endpoint, reason } => {
                Self::InvalidEndpoint { endpoint, reason }
            }
            CoreError::Config { message } => Self::Validation {
                field: "session".into(),
                reason: message,
            },
            CoreError::Protocol { message } | CoreError::Internal(message) => {
                Self::Internal(message)
            }
        }
    }
}
