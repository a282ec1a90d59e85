// ── Optimistic mutations ──
//
// Typed field updates written into an index entry ahead of the next
// poll. Each field names the variant it belongs to; a field that does
// not fit the entry's variant fails loudly instead of being dropped.

use serde::Serialize;

use crate::error::CoreError;
use crate::index::EntityIndexEntry;
use crate::model::{
    ColorLogicBrightness, ColorLogicPowerState, ColorLogicShow, ColorLogicSpeed, ConfigPayload,
    DeviceTelemetry, FilterState, OmniType, PumpState, RelayState, ValveActuatorState,
};

/// A live-state field, tagged with the telemetry variant it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TelemetryField {
    FilterState(FilterState),
    FilterSpeed(i64),
    PumpState(PumpState),
    PumpSpeed(i64),
    RelayState(RelayState),
    ValveActuatorState(ValveActuatorState),
    LightState(ColorLogicPowerState),
    LightShow(ColorLogicShow),
    LightSpeed(ColorLogicSpeed),
    LightBrightness(ColorLogicBrightness),
    HeaterSetPoint(i64),
    HeaterEnabled(bool),
    ChlorinatorEnabled(bool),
}

/// A setting that lives in the configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ConfigField {
    HeaterSetPoint(i64),
    HeaterEnabled(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum FieldUpdate {
    Telemetry(TelemetryField),
    Config(ConfigField),
}

impl TelemetryField {
    /// The device kind this field belongs to.
    pub fn target(self) -> OmniType {
        match self {
            Self::FilterState(_) | Self::FilterSpeed(_) => OmniType::Filter,
            Self::PumpState(_) | Self::PumpSpeed(_) => OmniType::Pump,
            Self::RelayState(_) => OmniType::Relay,
            Self::ValveActuatorState(_) => OmniType::ValveActuator,
            Self::LightState(_) | Self::LightShow(_) | Self::LightSpeed(_) | Self::LightBrightness(_) => {
                OmniType::ColorLogicLight
            }
            Self::HeaterSetPoint(_) | Self::HeaterEnabled(_) => OmniType::VirtualHeater,
            Self::ChlorinatorEnabled(_) => OmniType::Chlorinator,
        }
    }

    /// Write into `telemetry`; `false` when the variant does not match.
    fn write(self, telemetry: &mut DeviceTelemetry) -> bool {
        match (self, telemetry) {
            (Self::FilterState(v), DeviceTelemetry::Filter(t)) => t.state = v,
            (Self::FilterSpeed(v), DeviceTelemetry::Filter(t)) => t.speed = v,
            (Self::PumpState(v), DeviceTelemetry::Pump(t)) => t.state = v,
            (Self::PumpSpeed(v), DeviceTelemetry::Pump(t)) => t.speed = v,
            (Self::RelayState(v), DeviceTelemetry::Relay(t)) => t.state = v,
            (Self::ValveActuatorState(v), DeviceTelemetry::ValveActuator(t)) => t.state = v,
            (Self::LightState(v), DeviceTelemetry::ColorLogicLight(t)) => t.state = v,
            (Self::LightShow(v), DeviceTelemetry::ColorLogicLight(t)) => t.show = v,
            (Self::LightSpeed(v), DeviceTelemetry::ColorLogicLight(t)) => t.speed = v,
            (Self::LightBrightness(v), DeviceTelemetry::ColorLogicLight(t)) => t.brightness = v,
            (Self::HeaterSetPoint(v), DeviceTelemetry::VirtualHeater(t)) => {
                t.current_set_point = Some(v);
            }
            (Self::HeaterEnabled(v), DeviceTelemetry::VirtualHeater(t)) => t.enabled = v,
            (Self::ChlorinatorEnabled(v), DeviceTelemetry::Chlorinator(t)) => t.enabled = v,
            _ => return false,
        }
        true
    }
}

impl ConfigField {
    pub fn target(self) -> OmniType {
        match self {
            Self::HeaterSetPoint(_) | Self::HeaterEnabled(_) => OmniType::VirtualHeater,
        }
    }

    fn write(self, payload: &mut ConfigPayload) -> bool {
        match (self, payload) {
            (Self::HeaterSetPoint(v), ConfigPayload::VirtualHeater(c)) => {
                c.current_set_point = Some(v);
            }
            (Self::HeaterEnabled(v), ConfigPayload::VirtualHeater(c)) => c.enabled = v,
            _ => return false,
        }
        true
    }
}

/// A set of predicted field updates for one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mutation {
    updates: Vec<FieldUpdate>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn telemetry(mut self, field: TelemetryField) -> Self {
        self.updates.push(FieldUpdate::Telemetry(field));
        self
    }

    #[must_use]
    pub fn config(mut self, field: ConfigField) -> Self {
        self.updates.push(FieldUpdate::Config(field));
        self
    }

    pub fn updates(&self) -> &[FieldUpdate] {
        &self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Apply every update to `entry`. On error `entry` may be partly
    /// written; callers work on a copy.
    pub(crate) fn apply_to(&self, entry: &mut EntityIndexEntry) -> Result<(), CoreError> {
        let system_id = entry.msp_config.system_id;
        let actual = entry.msp_config.omni_type();

        for update in &self.updates {
            let written = match *update {
                FieldUpdate::Telemetry(field) => entry
                    .telemetry
                    .as_mut()
                    .is_some_and(|telemetry| field.write(telemetry)),
                FieldUpdate::Config(field) => field.write(&mut entry.msp_config.payload),
            };
            if !written {
                let expected = match *update {
                    FieldUpdate::Telemetry(field) if entry.telemetry.is_none() => {
                        format!("{} with telemetry", field.target())
                    }
                    FieldUpdate::Telemetry(field) => field.target().to_string(),
                    FieldUpdate::Config(field) => field.target().to_string(),
                };
                return Err(CoreError::wrong_kind(system_id, expected, actual));
            }
        }
        Ok(())
    }
}

impl FromIterator<FieldUpdate> for Mutation {
    fn from_iter<I: IntoIterator<Item = FieldUpdate>>(iter: I) -> Self {
        Self {
            updates: iter.into_iter().collect(),
        }
    }
}
