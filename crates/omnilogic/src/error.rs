//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use omnilogic_config::ConfigError;
use omnilogic_core::{ApiError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DATA: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Controller ───────────────────────────────────────────────────

    #[error("Could not reach controller: {reason}")]
    #[diagnostic(
        code(omnilogic::connection_failed),
        help("Check that the payload files exist and are readable, or that the controller is reachable.")
    )]
    ConnectionFailed { reason: String },

    #[error("Controller update timed out after {timeout:?}")]
    #[diagnostic(
        code(omnilogic::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { timeout: Duration },

    #[error("Controller request timed out")]
    #[diagnostic(
        code(omnilogic::request_timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    RequestTimeout,

    // ── Payloads ─────────────────────────────────────────────────────

    #[error("Could not parse {payload} payload: {message}")]
    #[diagnostic(
        code(omnilogic::parse),
        help("Check that the file holds a complete {payload} XML document.")
    )]
    Parse { payload: String, message: String },

    // ── Devices ──────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(omnilogic::not_found),
        help("Run: omnilogic {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Operation rejected: {message}")]
    #[diagnostic(code(omnilogic::rejected))]
    Rejected { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(omnilogic::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(omnilogic::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: omnilogic --host <HOST> config init --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(omnilogic::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(omnilogic::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Coordinator stopped before the operation completed")]
    #[diagnostic(code(omnilogic::stopped))]
    Stopped,

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(omnilogic::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(omnilogic::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } | Self::RequestTimeout => exit_code::TIMEOUT,
            Self::Parse { .. } => exit_code::DATA,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Parse { payload, message } => CliError::Parse {
                payload: payload.to_string(),
                message,
            },

            CoreError::UnknownDevice { system_id } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: system_id.to_string(),
                list_command: "index".into(),
            },

            err @ CoreError::WrongDeviceKind { .. } => CliError::Validation {
                field: "system_id".into(),
                reason: err.to_string(),
            },

            // The cause carries the actionable detail.
            CoreError::UpdateFailed { source } => CliError::from(*source),

            CoreError::Timeout { timeout } => CliError::Timeout { timeout },

            CoreError::CommandDispatch { source, .. } | CoreError::Api(source) => source.into(),

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::CoordinatorStopped => CliError::Stopped,
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Connection(reason) => CliError::ConnectionFailed { reason },
            ApiError::Timeout => CliError::RequestTimeout,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
