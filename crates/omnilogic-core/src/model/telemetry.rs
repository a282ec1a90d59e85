// ── Telemetry records ──
//
// The latest live-state snapshot, grouped by device kind the way the
// controller reports it. Raw numeric readings are kept as reported;
// sentinel interpretation happens at read time (see `sentinel`).

use serde::{Deserialize, Serialize};

use super::SystemId;
use super::codes::{
    BackyardState, ColorLogicBrightness, ColorLogicPowerState, ColorLogicShow, ColorLogicSpeed,
    FilterState, HeaterState, PumpState, RelayState, ValveActuatorState,
};
use super::omni_type::OmniType;
use crate::parse::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackyardTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "state"), default = "backyard_off")]
    pub state: BackyardState,
    #[serde(rename(deserialize = "airTemp"), default)]
    pub air_temp: Option<i64>,
    #[serde(rename(deserialize = "status"), default)]
    pub status: Option<i64>,
    #[serde(rename(deserialize = "statusVersion"), default)]
    pub status_version: Option<i64>,
    #[serde(rename(deserialize = "configChksum"), default)]
    pub config_checksum: Option<i64>,
    #[serde(rename(deserialize = "mspVersion"), default, deserialize_with = "de::opt_text")]
    pub msp_version: Option<String>,
}

fn backyard_off() -> BackyardState {
    BackyardState::Off
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOfWaterTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "waterTemp"), default)]
    pub water_temp: Option<i64>,
    #[serde(rename(deserialize = "flow"), default)]
    pub flow: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "filterState"))]
    pub state: FilterState,
    #[serde(rename(deserialize = "filterSpeed"), default)]
    pub speed: i64,
    #[serde(rename(deserialize = "reportedFilterSpeed"), default)]
    pub reported_speed: Option<i64>,
    #[serde(rename(deserialize = "lastSpeed"), default)]
    pub last_speed: Option<i64>,
    #[serde(rename(deserialize = "power"), default)]
    pub power: Option<i64>,
    #[serde(rename(deserialize = "valvePosition"), default)]
    pub valve_position: Option<i64>,
    #[serde(rename(deserialize = "whyFilterIsOn"), default)]
    pub why_on: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "pumpState"))]
    pub state: PumpState,
    #[serde(rename(deserialize = "pumpSpeed"), default)]
    pub speed: i64,
    #[serde(rename(deserialize = "lastSpeed"), default)]
    pub last_speed: Option<i64>,
    #[serde(rename(deserialize = "whyOn"), default)]
    pub why_on: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "relayState"))]
    pub state: RelayState,
    #[serde(rename(deserialize = "whyOn"), default)]
    pub why_on: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveActuatorTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "valveActuatorState"))]
    pub state: ValveActuatorState,
    #[serde(rename(deserialize = "whyOn"), default)]
    pub why_on: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "lightState"))]
    pub state: ColorLogicPowerState,
    #[serde(rename(deserialize = "currentShow"))]
    pub show: ColorLogicShow,
    #[serde(rename(deserialize = "speed"))]
    pub speed: ColorLogicSpeed,
    #[serde(rename(deserialize = "brightness"))]
    pub brightness: ColorLogicBrightness,
    #[serde(rename(deserialize = "specialEffect"), default)]
    pub special_effect: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualHeaterTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "Current_Set_Point"), default)]
    pub current_set_point: Option<i64>,
    #[serde(rename(deserialize = "enable"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "SolarSetPoint"), default)]
    pub solar_set_point: Option<i64>,
    #[serde(rename(deserialize = "Mode"), default)]
    pub mode: Option<i64>,
    #[serde(rename(deserialize = "SilentMode"), default)]
    pub silent_mode: Option<i64>,
    #[serde(rename(deserialize = "whyHeaterIsOn"), default)]
    pub why_on: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaterTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "heaterState"))]
    pub state: HeaterState,
    #[serde(rename(deserialize = "temp"), default)]
    pub temp: Option<i64>,
    #[serde(rename(deserialize = "enable"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "priority"), default)]
    pub priority: Option<i64>,
    #[serde(rename(deserialize = "maintainFor"), default)]
    pub maintain_for: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChlorinatorTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "status"), default)]
    pub status: Option<i64>,
    #[serde(rename(deserialize = "instantSaltLevel"), default)]
    pub instant_salt_level: Option<i64>,
    #[serde(rename(deserialize = "avgSaltLevel"), default)]
    pub avg_salt_level: Option<i64>,
    #[serde(rename(deserialize = "chlrAlert"), default)]
    pub alert: Option<i64>,
    #[serde(rename(deserialize = "chlrError"), default)]
    pub error: Option<i64>,
    #[serde(rename(deserialize = "sc"), default)]
    pub superchlorinating: Option<i64>,
    #[serde(rename(deserialize = "operatingState"), default)]
    pub operating_state: Option<i64>,
    #[serde(rename(deserialize = "operatingMode"), default)]
    pub operating_mode: Option<i64>,
    #[serde(rename(deserialize = "Timed_Percent"), default)]
    pub timed_percent: Option<i64>,
    #[serde(rename(deserialize = "enable"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsadTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "status"), default)]
    pub status: Option<i64>,
    #[serde(rename(deserialize = "ph"), default, deserialize_with = "de::opt_f64")]
    pub ph: Option<f64>,
    #[serde(rename(deserialize = "orp"), default)]
    pub orp: Option<i64>,
    #[serde(rename(deserialize = "mode"), default)]
    pub mode: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTelemetry {
    #[serde(rename(deserialize = "systemId"))]
    pub system_id: SystemId,
    #[serde(rename(deserialize = "groupState"), default)]
    pub state: Option<i64>,
}

// ── Tagged union ─────────────────────────────────────────────────────

/// Live state of one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceTelemetry {
    Backyard(BackyardTelemetry),
    BodyOfWater(BodyOfWaterTelemetry),
    Filter(FilterTelemetry),
    Pump(PumpTelemetry),
    Relay(RelayTelemetry),
    ValveActuator(ValveActuatorTelemetry),
    ColorLogicLight(LightTelemetry),
    VirtualHeater(VirtualHeaterTelemetry),
    Heater(HeaterTelemetry),
    Chlorinator(ChlorinatorTelemetry),
    Csad(CsadTelemetry),
    Group(GroupTelemetry),
}

impl DeviceTelemetry {
    pub fn system_id(&self) -> SystemId {
        match self {
            Self::Backyard(t) => t.system_id,
            Self::BodyOfWater(t) => t.system_id,
            Self::Filter(t) => t.system_id,
            Self::Pump(t) => t.system_id,
            Self::Relay(t) => t.system_id,
            Self::ValveActuator(t) => t.system_id,
            Self::ColorLogicLight(t) => t.system_id,
            Self::VirtualHeater(t) => t.system_id,
            Self::Heater(t) => t.system_id,
            Self::Chlorinator(t) => t.system_id,
            Self::Csad(t) => t.system_id,
            Self::Group(t) => t.system_id,
        }
    }

    /// The device kind this record reports on.
    pub fn omni_type(&self) -> OmniType {
        match self {
            Self::Backyard(_) => OmniType::Backyard,
            Self::BodyOfWater(_) => OmniType::BodyOfWater,
            Self::Filter(_) => OmniType::Filter,
            Self::Pump(_) => OmniType::Pump,
            Self::Relay(_) => OmniType::Relay,
            Self::ValveActuator(_) => OmniType::ValveActuator,
            Self::ColorLogicLight(_) => OmniType::ColorLogicLight,
            Self::VirtualHeater(_) => OmniType::VirtualHeater,
            Self::Heater(_) => OmniType::HeaterEquipment,
            Self::Chlorinator(_) => OmniType::Chlorinator,
            Self::Csad(_) => OmniType::Csad,
            Self::Group(_) => OmniType::Group,
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Parsed `<STATUS>` document, bucketed by device kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub version: Option<String>,
    pub backyard: BackyardTelemetry,
    pub bodies_of_water: Vec<BodyOfWaterTelemetry>,
    pub filters: Vec<FilterTelemetry>,
    pub pumps: Vec<PumpTelemetry>,
    pub relays: Vec<RelayTelemetry>,
    pub valve_actuators: Vec<ValveActuatorTelemetry>,
    pub lights: Vec<LightTelemetry>,
    pub virtual_heaters: Vec<VirtualHeaterTelemetry>,
    pub heaters: Vec<HeaterTelemetry>,
    pub chlorinators: Vec<ChlorinatorTelemetry>,
    pub csads: Vec<CsadTelemetry>,
    pub groups: Vec<GroupTelemetry>,
}

impl Telemetry {
    /// Every record as a tagged value, bucket by bucket.
    pub fn records(&self) -> impl Iterator<Item = DeviceTelemetry> + '_ {
        std::iter::once(DeviceTelemetry::Backyard(self.backyard.clone()))
            .chain(self.bodies_of_water.iter().cloned().map(DeviceTelemetry::BodyOfWater))
            .chain(self.filters.iter().cloned().map(DeviceTelemetry::Filter))
            .chain(self.pumps.iter().cloned().map(DeviceTelemetry::Pump))
            .chain(self.relays.iter().cloned().map(DeviceTelemetry::Relay))
            .chain(self.valve_actuators.iter().cloned().map(DeviceTelemetry::ValveActuator))
            .chain(self.lights.iter().cloned().map(DeviceTelemetry::ColorLogicLight))
            .chain(self.virtual_heaters.iter().cloned().map(DeviceTelemetry::VirtualHeater))
            .chain(self.heaters.iter().cloned().map(DeviceTelemetry::Heater))
            .chain(self.chlorinators.iter().cloned().map(DeviceTelemetry::Chlorinator))
            .chain(self.csads.iter().cloned().map(DeviceTelemetry::Csad))
            .chain(self.groups.iter().cloned().map(DeviceTelemetry::Group))
    }

    /// Search every bucket for the record carrying `system_id`.
    pub fn get(&self, system_id: SystemId) -> Option<DeviceTelemetry> {
        fn find<T: Clone>(
            bucket: &[T],
            system_id: SystemId,
            id: fn(&T) -> SystemId,
            wrap: fn(T) -> DeviceTelemetry,
        ) -> Option<DeviceTelemetry> {
            bucket.iter().find(|t| id(t) == system_id).cloned().map(wrap)
        }

        if self.backyard.system_id == system_id {
            return Some(DeviceTelemetry::Backyard(self.backyard.clone()));
        }
        find(&self.bodies_of_water, system_id, |t| t.system_id, DeviceTelemetry::BodyOfWater)
            .or_else(|| find(&self.filters, system_id, |t| t.system_id, DeviceTelemetry::Filter))
            .or_else(|| find(&self.pumps, system_id, |t| t.system_id, DeviceTelemetry::Pump))
            .or_else(|| find(&self.relays, system_id, |t| t.system_id, DeviceTelemetry::Relay))
            .or_else(|| {
                find(&self.valve_actuators, system_id, |t| t.system_id, DeviceTelemetry::ValveActuator)
            })
            .or_else(|| {
                find(&self.lights, system_id, |t| t.system_id, DeviceTelemetry::ColorLogicLight)
            })
            .or_else(|| {
                find(&self.virtual_heaters, system_id, |t| t.system_id, DeviceTelemetry::VirtualHeater)
            })
            .or_else(|| find(&self.heaters, system_id, |t| t.system_id, DeviceTelemetry::Heater))
            .or_else(|| {
                find(&self.chlorinators, system_id, |t| t.system_id, DeviceTelemetry::Chlorinator)
            })
            .or_else(|| find(&self.csads, system_id, |t| t.system_id, DeviceTelemetry::Csad))
            .or_else(|| find(&self.groups, system_id, |t| t.system_id, DeviceTelemetry::Group))
    }

    /// Total number of records across all buckets.
    pub fn len(&self) -> usize {
        1 + self.bodies_of_water.len()
            + self.filters.len()
            + self.pumps.len()
            + self.relays.len()
            + self.valve_actuators.len()
            + self.lights.len()
            + self.virtual_heaters.len()
            + self.heaters.len()
            + self.chlorinators.len()
            + self.csads.len()
            + self.groups.len()
    }

    /// Never true: a snapshot always carries the backyard record.
    pub fn is_empty(&self) -> bool {
        false
    }
}
