// ── Runtime coordinator configuration ──
//
// These types describe *how* the coordinator talks to one controller.
// They never touch disk: the CLI (via omnilogic-config) builds a
// `CoordinatorConfig` and hands it in.

use std::time::Duration;

use crate::error::CoreError;

/// Default UDP port of the OmniLogic local API.
pub const DEFAULT_PORT: u16 = 10444;
/// Default time between refresh cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Lower bound on the poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Default per-request timeout for the network client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const MIN_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Budget for one whole fetch + parse + build cycle.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for polling a single controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Controller address, consumed by the network client.
    pub host: String,
    pub port: u16,
    /// How often to run a refresh cycle. Clamped to [`MIN_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Per-request timeout handed to the network client.
    pub request_timeout: Duration,
    /// Timeout around a whole refresh cycle.
    pub update_timeout: Duration,
    /// Request a refresh right after every dispatched command.
    pub refresh_after_command: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            refresh_after_command: false,
        }
    }
}

impl CoordinatorConfig {
    /// The poll interval actually used, never below the minimum.
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config {
                message: "host must not be empty".into(),
            });
        }
        if !(MIN_REQUEST_TIMEOUT..=MAX_REQUEST_TIMEOUT).contains(&self.request_timeout) {
            return Err(CoreError::Config {
                message: format!(
                    "request timeout {:?} outside {:?}..={:?}",
                    self.request_timeout, MIN_REQUEST_TIMEOUT, MAX_REQUEST_TIMEOUT
                ),
            });
        }
        if self.update_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "update timeout must be positive".into(),
            });
        }
        Ok(())
    }
}
