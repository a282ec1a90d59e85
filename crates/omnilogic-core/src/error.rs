// ── Core error types ──
//
// User-facing errors from omnilogic-core. Collaborator failures arrive
// as `ApiError` and are wrapped into domain variants at the coordinator
// boundary; parser and builder failures never escape a refresh cycle
// except as `UpdateFailed`.

use std::time::Duration;

use thiserror::Error;

use crate::model::{OmniType, SystemId};

/// Which payload a parse failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PayloadKind {
    #[strum(serialize = "configuration")]
    Configuration,
    #[strum(serialize = "telemetry")]
    Telemetry,
}

/// Failures reported by the network collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("connection to controller failed: {0}")]
    Connection(String),

    #[error("controller request timed out")]
    Timeout,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("failed to parse {payload} payload: {message}")]
    Parse {
        payload: PayloadKind,
        message: String,
    },

    #[error("Unknown device: system id {system_id}")]
    UnknownDevice { system_id: SystemId },

    #[error("Device {system_id} is a {actual}, expected {expected}")]
    WrongDeviceKind {
        system_id: SystemId,
        expected: String,
        actual: OmniType,
    },

    // ── Refresh errors ───────────────────────────────────────────────
    #[error("Update failed: {source}")]
    UpdateFailed {
        #[source]
        source: Box<CoreError>,
    },

    #[error("Controller update timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Command to device {system_id} failed: {source}")]
    CommandDispatch {
        system_id: SystemId,
        #[source]
        source: ApiError,
    },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] ApiError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Coordinator has been shut down")]
    CoordinatorStopped,
}

impl CoreError {
    pub(crate) fn parse(payload: PayloadKind, message: impl Into<String>) -> Self {
        Self::Parse {
            payload,
            message: message.into(),
        }
    }

    pub(crate) fn wrong_kind(system_id: SystemId, expected: impl Into<String>, actual: OmniType) -> Self {
        Self::WrongDeviceKind {
            system_id,
            expected: expected.into(),
            actual,
        }
    }

    /// Wrap any failure from a refresh cycle.
    pub(crate) fn update_failed(source: CoreError) -> Self {
        match source {
            already @ Self::UpdateFailed { .. } => already,
            other => Self::UpdateFailed {
                source: Box::new(other),
            },
        }
    }

    /// Soft failures leave shared state untouched and are safe to retry.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::UnknownDevice { .. } | Self::WrongDeviceKind { .. } | Self::Rejected { .. }
        )
    }
}
