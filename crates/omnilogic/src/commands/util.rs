//! Shared helpers for command handlers.

use std::path::Path;

use omnilogic_core::model::sentinel::{self, SentinelField};
use omnilogic_core::{
    Coordinator, DeviceTelemetry, EntityIndex, EntityIndexEntry, parse_config, parse_telemetry,
};

use crate::cli::{GlobalOpts, PayloadArgs};
use crate::config;
use crate::error::CliError;
use crate::replay::ReplayApi;

/// Read a payload file, naming the path in any error.
pub fn read_payload(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path)
        .map_err(|e| CliError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))
}

/// Parse both payload files and build the index in one pass.
pub fn load_index(payloads: &PayloadArgs) -> Result<EntityIndex, CliError> {
    let config = parse_config(&read_payload(&payloads.config)?)?;
    let telemetry = parse_telemetry(&read_payload(&payloads.telemetry)?)?;
    Ok(EntityIndex::from_payloads(&config, &telemetry))
}

/// A coordinator over the replay client, not yet started.
pub fn replay_coordinator(
    payloads: &PayloadArgs,
    global: &GlobalOpts,
) -> Result<Coordinator<ReplayApi>, CliError> {
    let config = config::resolve_coordinator_config(global)?;
    Ok(Coordinator::new(config, ReplayApi::new(payloads)))
}

/// One-word summary of an entry's live state for table views.
pub fn state_summary(entry: &EntityIndexEntry) -> String {
    let Some(telemetry) = &entry.telemetry else {
        return "-".into();
    };
    match telemetry {
        DeviceTelemetry::Backyard(t) => t.state.to_string(),
        DeviceTelemetry::BodyOfWater(t) => {
            sentinel::reading(SentinelField::WaterTemp, t.water_temp)
                .map_or_else(|| "-".into(), |temp| format!("{temp}°"))
        }
        DeviceTelemetry::Filter(t) => format!("{} {}%", t.state, t.speed),
        DeviceTelemetry::Pump(t) => format!("{} {}%", t.state, t.speed),
        DeviceTelemetry::Relay(t) => t.state.to_string(),
        DeviceTelemetry::ValveActuator(t) => t.state.to_string(),
        DeviceTelemetry::ColorLogicLight(t) => format!("{} show {}", t.state, t.show),
        DeviceTelemetry::VirtualHeater(t) => {
            let enabled = if t.enabled { "ENABLED" } else { "DISABLED" };
            t.current_set_point
                .map_or_else(|| enabled.to_owned(), |sp| format!("{enabled} {sp}°"))
        }
        DeviceTelemetry::Heater(t) => t.state.to_string(),
        DeviceTelemetry::Chlorinator(t) => {
            if t.enabled { "ENABLED" } else { "DISABLED" }.to_owned()
        }
        DeviceTelemetry::Csad(t) => t.ph.map_or_else(|| "-".into(), |ph| format!("pH {ph:.1}")),
        DeviceTelemetry::Group(t) => t.state.map_or_else(|| "-".into(), |s| s.to_string()),
    }
}

pub fn bow_label(entry: &EntityIndexEntry) -> String {
    entry
        .msp_config
        .bow_id
        .map(|id| id.to_string())
        .unwrap_or_default()
}
