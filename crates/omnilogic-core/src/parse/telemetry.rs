// ── Telemetry parser ──
//
// `<STATUS>` → `Telemetry`. Every record is a flat element whose
// attributes carry the live state; records are bucketed by element name.

use serde::Deserialize;

use super::{de, xml};
use crate::error::{CoreError, PayloadKind};
use crate::model::{
    BackyardTelemetry, BodyOfWaterTelemetry, ChlorinatorTelemetry, CsadTelemetry,
    FilterTelemetry, GroupTelemetry, HeaterTelemetry, LightTelemetry, PumpTelemetry,
    RelayTelemetry, Telemetry, ValveActuatorTelemetry, VirtualHeaterTelemetry,
};

const ROOT: &str = "STATUS";

#[derive(Deserialize)]
struct RawStatus {
    #[serde(default, deserialize_with = "de::opt_text")]
    version: Option<String>,
    #[serde(rename = "Backyard", default, deserialize_with = "de::one_or_many")]
    backyard: Vec<BackyardTelemetry>,
    #[serde(rename = "BodyOfWater", default, deserialize_with = "de::one_or_many")]
    bodies_of_water: Vec<BodyOfWaterTelemetry>,
    #[serde(rename = "Filter", default, deserialize_with = "de::one_or_many")]
    filters: Vec<FilterTelemetry>,
    #[serde(rename = "Pump", default, deserialize_with = "de::one_or_many")]
    pumps: Vec<PumpTelemetry>,
    #[serde(rename = "Relay", default, deserialize_with = "de::one_or_many")]
    relays: Vec<RelayTelemetry>,
    #[serde(rename = "ValveActuator", default, deserialize_with = "de::one_or_many")]
    valve_actuators: Vec<ValveActuatorTelemetry>,
    #[serde(rename = "ColorLogic_Light", default, deserialize_with = "de::one_or_many")]
    lights: Vec<LightTelemetry>,
    #[serde(rename = "VirtualHeater", default, deserialize_with = "de::one_or_many")]
    virtual_heaters: Vec<VirtualHeaterTelemetry>,
    #[serde(rename = "Heater", default, deserialize_with = "de::one_or_many")]
    heaters: Vec<HeaterTelemetry>,
    #[serde(rename = "Chlorinator", default, deserialize_with = "de::one_or_many")]
    chlorinators: Vec<ChlorinatorTelemetry>,
    #[serde(rename = "CSAD", default, deserialize_with = "de::one_or_many")]
    csads: Vec<CsadTelemetry>,
    #[serde(rename = "Group", default, deserialize_with = "de::one_or_many")]
    groups: Vec<GroupTelemetry>,
}

/// Decode a raw `<STATUS>` payload into bucketed live-state records.
///
/// Sentinel values are kept as reported; see [`crate::model::sentinel`].
pub fn parse_telemetry(payload: &[u8]) -> Result<Telemetry, CoreError> {
    let fail = |message: String| CoreError::parse(PayloadKind::Telemetry, message);

    let doc = xml::normalize(payload).map_err(fail)?;
    if doc.root != ROOT {
        return Err(fail(format!("expected <{ROOT}> root, found <{}>", doc.root)));
    }

    let raw: RawStatus = serde_json::from_value(doc.body).map_err(|e| fail(e.to_string()))?;
    let backyard = raw
        .backyard
        .into_iter()
        .next()
        .ok_or_else(|| fail("missing <Backyard> record".into()))?;

    Ok(Telemetry {
        version: raw.version,
        backyard,
        bodies_of_water: raw.bodies_of_water,
        filters: raw.filters,
        pumps: raw.pumps,
        relays: raw.relays,
        valve_actuators: raw.valve_actuators,
        lights: raw.lights,
        virtual_heaters: raw.virtual_heaters,
        heaters: raw.heaters,
        chlorinators: raw.chlorinators,
        csads: raw.csads,
        groups: raw.groups,
    })
}
