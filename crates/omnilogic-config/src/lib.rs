//! Shared configuration for OmniLogic tools.
//!
//! TOML profiles plus environment overrides, and translation to
//! `omnilogic_core::CoordinatorConfig`. The CLI layers its flag
//! overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use omnilogic_core::CoordinatorConfig;
use omnilogic_core::config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPDATE_TIMEOUT,
    MAX_REQUEST_TIMEOUT, MIN_POLL_INTERVAL, MIN_REQUEST_TIMEOUT,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the default.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds between refresh cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Budget for a whole refresh cycle, in seconds.
    #[serde(default = "default_update_timeout")]
    pub update_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
            update_timeout: default_update_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_timeout() -> f64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs_f64()
}
fn default_update_timeout() -> u64 {
    DEFAULT_UPDATE_TIMEOUT.as_secs()
}

/// A named controller profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Controller address (e.g., "192.168.1.50").
    pub host: String,

    /// UDP port of the local API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Override poll interval, in seconds.
    pub poll_interval: Option<u64>,

    /// Override per-request timeout, in seconds.
    pub timeout: Option<f64>,

    /// Refresh right after each dispatched command.
    #[serde(default)]
    pub refresh_after_command: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            poll_interval: None,
            timeout: None,
            refresh_after_command: false,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "omnilogic", "omnilogic").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("omnilogic");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OMNILOGIC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CoordinatorConfig` from a profile and the global defaults.
///
/// A poll interval below the minimum is clamped. Every other
/// out-of-range value is a validation error.
pub fn profile_to_coordinator_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    if profile.port == 0 {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be non-zero".into(),
        });
    }

    let requested = Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    let poll_interval = if requested < MIN_POLL_INTERVAL {
        warn!(
            requested_secs = requested.as_secs(),
            minimum_secs = MIN_POLL_INTERVAL.as_secs(),
            "poll interval below minimum, clamping"
        );
        MIN_POLL_INTERVAL
    } else {
        requested
    };

    let request_timeout = timeout_from_secs(profile.timeout.unwrap_or(defaults.timeout))?;

    if defaults.update_timeout == 0 {
        return Err(ConfigError::Validation {
            field: "update_timeout".into(),
            reason: "must be positive".into(),
        });
    }

    Ok(CoordinatorConfig {
        host: profile.host.trim().to_owned(),
        port: profile.port,
        poll_interval,
        request_timeout,
        update_timeout: Duration::from_secs(defaults.update_timeout),
        refresh_after_command: profile.refresh_after_command,
    })
}

fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    let out_of_range = || ConfigError::Validation {
        field: "timeout".into(),
        reason: format!(
            "{secs}s is outside {}s..={}s",
            MIN_REQUEST_TIMEOUT.as_secs_f64(),
            MAX_REQUEST_TIMEOUT.as_secs_f64()
        ),
    };
    let timeout = Duration::try_from_secs_f64(secs).map_err(|_| out_of_range())?;
    if (MIN_REQUEST_TIMEOUT..=MAX_REQUEST_TIMEOUT).contains(&timeout) {
        Ok(timeout)
    } else {
        Err(out_of_range())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults, Defaults::default());
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let (_dir, path) = write_config(
            r#"
default_profile = "home"

[defaults]
poll_interval = 15

[profiles.home]
host = "192.168.1.50"
timeout = 2.5
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.active_profile_name(None), "home");
        assert_eq!(config.active_profile_name(Some("cabin")), "cabin");

        let profile = config.profile("home").unwrap();
        assert_eq!(profile.port, DEFAULT_PORT);
        assert_eq!(config.defaults.output, "table");

        let coordinator = profile_to_coordinator_config(profile, &config.defaults).unwrap();
        assert_eq!(coordinator.host, "192.168.1.50");
        assert_eq!(coordinator.poll_interval, Duration::from_secs(15));
        assert_eq!(coordinator.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config
            .profiles
            .insert("default".into(), Profile::new("10.0.0.7"));
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, config.profiles);
    }

    #[test]
    fn short_poll_interval_is_clamped() {
        let profile = Profile {
            poll_interval: Some(1),
            ..Profile::new("pool.local")
        };
        let config = profile_to_coordinator_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.poll_interval, MIN_POLL_INTERVAL);
    }

    #[test]
    fn timeout_outside_range_fails_validation() {
        for secs in [0.1, 10.5, f64::NAN, -1.0] {
            let profile = Profile {
                timeout: Some(secs),
                ..Profile::new("pool.local")
            };
            let err = profile_to_coordinator_config(&profile, &Defaults::default()).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation { field, .. } if field == "timeout"),
                "{secs}: {err}"
            );
        }
    }

    #[test]
    fn empty_host_fails_validation() {
        let err =
            profile_to_coordinator_config(&Profile::new("  "), &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "host"));
    }
}
