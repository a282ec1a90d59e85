//! CLI configuration: thin wrapper around `omnilogic_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --poll-interval, --timeout).

use omnilogic_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use omnilogic_config::{
    Config, Profile, config_path, load_config, profile_to_coordinator_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names, for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        return "(none)".into();
    }
    config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

/// Apply flag overrides on top of `profile`.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(secs) = global.poll_interval {
        profile.poll_interval = Some(secs);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }
}

/// Build a `CoordinatorConfig` from the config file, profile, and CLI overrides.
///
/// An explicitly named profile must exist. Without one, a missing
/// default profile falls back to flags and built-in defaults.
pub fn resolve_coordinator_config(global: &GlobalOpts) -> Result<CoordinatorConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name: profile_name,
            });
        }
        None => Profile::new(CoordinatorConfig::default().host),
    };
    apply_overrides(&mut profile, global);

    Ok(profile_to_coordinator_config(&profile, &cfg.defaults)?)
}
