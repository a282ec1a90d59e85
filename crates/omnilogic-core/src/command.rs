// ── Command API ──
//
// All control operations flow through a unified `Command` enum. Each
// command narrows its target entry, validates against the current
// state, and yields both the wire request and the optimistic update
// to apply once the controller accepts it.

use serde::Serialize;

use crate::api::{CommandRequest, EquipmentValue, TemperatureUnit};
use crate::entity::{SpeedPreset, kind};
use crate::error::CoreError;
use crate::index::{EntityIndex, EntityIndexEntry};
use crate::model::{
    ColorLogicBrightness, ColorLogicPowerState, ColorLogicShow, ColorLogicSpeed, FilterState,
    LightTelemetry, OmniType, PumpState, RelayState, SpeedLimits, SystemId, UnitSystem,
    ValveActuatorState,
};
use crate::mutation::{ConfigField, Mutation, TelemetryField};

/// All control operations against a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    // ── Switching ────────────────────────────────────────────────────
    TurnOn,
    TurnOff,

    // ── Pumps and filters ────────────────────────────────────────────
    SetSpeed {
        percent: i64,
    },
    SetSpeedPreset {
        preset: SpeedPreset,
    },

    // ── Lights ───────────────────────────────────────────────────────
    SetLightShow {
        show: Option<ColorLogicShow>,
        speed: Option<ColorLogicSpeed>,
        brightness: Option<ColorLogicBrightness>,
    },

    // ── Heaters ──────────────────────────────────────────────────────
    SetHeaterTemperature {
        temperature: i64,
    },
    SetHeaterEnabled {
        enabled: bool,
    },

    // ── Backyard ─────────────────────────────────────────────────────
    RestoreIdle,
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    /// The controller accepted the command and the prediction was written.
    Applied,
    /// The controller accepted the command; nothing was predicted.
    Sent,
    /// The controller accepted the command but the prediction could not
    /// be written.
    Unconfirmed { reason: String },
}

impl Command {
    /// Validate against `entry` and build the request to send.
    pub fn request(
        &self,
        index: &EntityIndex,
        entry: &EntityIndexEntry,
    ) -> Result<CommandRequest, CoreError> {
        let system_id = entry.system_id();
        let omni_type = entry.omni_type();

        match (self, omni_type) {
            (Self::TurnOn, OmniType::Filter | OmniType::Pump) => {
                let is_on = resume_speed(index, system_id)
                    .map_or(EquipmentValue::On(true), EquipmentValue::Speed);
                Ok(CommandRequest::SetEquipment { is_on })
            }
            (
                Self::TurnOn | Self::TurnOff,
                OmniType::Relay | OmniType::ValveActuator | OmniType::Filter | OmniType::Pump,
            ) => Ok(CommandRequest::SetEquipment {
                is_on: EquipmentValue::On(matches!(self, Self::TurnOn)),
            }),

            (Self::TurnOn, OmniType::ColorLogicLight) => {
                ensure_light_accepts(index, system_id)?;
                Ok(CommandRequest::SetEquipment {
                    is_on: EquipmentValue::On(true),
                })
            }
            (Self::TurnOff, OmniType::ColorLogicLight) => Ok(CommandRequest::SetEquipment {
                is_on: EquipmentValue::On(false),
            }),

            (Self::TurnOn | Self::TurnOff, OmniType::Chlorinator) => {
                Ok(CommandRequest::SetChlorinatorEnable {
                    enabled: matches!(self, Self::TurnOn),
                })
            }

            (Self::SetSpeed { .. } | Self::SetSpeedPreset { .. }, OmniType::Filter | OmniType::Pump) => {
                let percent = self.target_speed(index, system_id)?;
                Ok(CommandRequest::SetEquipment {
                    is_on: EquipmentValue::Speed(percent),
                })
            }

            (
                Self::SetLightShow {
                    show,
                    speed,
                    brightness,
                },
                OmniType::ColorLogicLight,
            ) => {
                ensure_light_accepts(index, system_id)?;
                let current = index.entity::<kind::Light>(system_id)?.telemetry();
                let (show, speed, brightness) = resolve_show(current, *show, *speed, *brightness)
                    .ok_or_else(|| CoreError::Rejected {
                        message: format!(
                            "light {system_id} has no reported state to fill in missing show settings"
                        ),
                    })?;
                Ok(CommandRequest::SetLightShow {
                    show,
                    speed,
                    brightness,
                })
            }

            (Self::SetHeaterTemperature { temperature }, OmniType::VirtualHeater) => {
                let heater = index.entity::<kind::VirtualHeater>(system_id)?;
                if !(heater.min_temp()..=heater.max_temp()).contains(temperature) {
                    return Err(CoreError::Rejected {
                        message: format!(
                            "temperature {temperature} is outside {}..={} for heater {system_id}",
                            heater.min_temp(),
                            heater.max_temp()
                        ),
                    });
                }
                let unit = match index.system().units {
                    UnitSystem::Metric => TemperatureUnit::Celsius,
                    UnitSystem::Standard | UnitSystem::Unknown => TemperatureUnit::Fahrenheit,
                };
                Ok(CommandRequest::SetHeater {
                    temperature: *temperature,
                    unit,
                })
            }
            (Self::SetHeaterEnabled { enabled }, OmniType::VirtualHeater) => {
                Ok(CommandRequest::SetHeaterEnable { enabled: *enabled })
            }

            (Self::RestoreIdle, OmniType::Backyard) => Ok(CommandRequest::RestoreIdle),

            (command, actual) => Err(CoreError::wrong_kind(
                system_id,
                format!("a target for {}", command.name()),
                actual,
            )),
        }
    }

    /// The state the device is expected to reach once the controller
    /// applies this command. Call after [`request`](Self::request)
    /// succeeded.
    pub fn prediction(&self, index: &EntityIndex, entry: &EntityIndexEntry) -> Mutation {
        let system_id = entry.system_id();

        match (self, entry.omni_type()) {
            (Self::TurnOn, OmniType::Relay) => {
                Mutation::new().telemetry(TelemetryField::RelayState(RelayState::On))
            }
            (Self::TurnOff, OmniType::Relay) => {
                Mutation::new().telemetry(TelemetryField::RelayState(RelayState::Off))
            }
            (Self::TurnOn, OmniType::ValveActuator) => Mutation::new()
                .telemetry(TelemetryField::ValveActuatorState(ValveActuatorState::On)),
            (Self::TurnOff, OmniType::ValveActuator) => Mutation::new()
                .telemetry(TelemetryField::ValveActuatorState(ValveActuatorState::Off)),

            (Self::TurnOn, OmniType::Filter) => {
                Mutation::new().telemetry(TelemetryField::FilterState(FilterState::Priming))
            }
            (Self::TurnOff, OmniType::Filter) => Mutation::new()
                .telemetry(TelemetryField::FilterState(FilterState::Off))
                .telemetry(TelemetryField::FilterSpeed(0)),
            (Self::TurnOn, OmniType::Pump) => {
                Mutation::new().telemetry(TelemetryField::PumpState(PumpState::On))
            }
            (Self::TurnOff, OmniType::Pump) => Mutation::new()
                .telemetry(TelemetryField::PumpState(PumpState::Off))
                .telemetry(TelemetryField::PumpSpeed(0)),

            (Self::SetSpeed { .. } | Self::SetSpeedPreset { .. }, OmniType::Filter) => {
                match self.target_speed(index, system_id) {
                    Ok(percent) => Mutation::new()
                        .telemetry(TelemetryField::FilterState(FilterState::On))
                        .telemetry(TelemetryField::FilterSpeed(percent)),
                    Err(_) => Mutation::new(),
                }
            }
            (Self::SetSpeed { .. } | Self::SetSpeedPreset { .. }, OmniType::Pump) => {
                match self.target_speed(index, system_id) {
                    Ok(percent) => Mutation::new()
                        .telemetry(TelemetryField::PumpState(PumpState::On))
                        .telemetry(TelemetryField::PumpSpeed(percent)),
                    Err(_) => Mutation::new(),
                }
            }

            (Self::TurnOn, OmniType::ColorLogicLight) => match light_state(index, system_id) {
                Some(ColorLogicPowerState::Off) => Mutation::new().telemetry(
                    TelemetryField::LightState(ColorLogicPowerState::FifteenSecondsWhite),
                ),
                _ => Mutation::new(),
            },
            (Self::TurnOff, OmniType::ColorLogicLight) => match light_state(index, system_id) {
                Some(state) if state.is_lit() => Mutation::new()
                    .telemetry(TelemetryField::LightState(ColorLogicPowerState::PoweringOff)),
                _ => Mutation::new(),
            },
            (
                Self::SetLightShow {
                    show,
                    speed,
                    brightness,
                },
                OmniType::ColorLogicLight,
            ) => {
                let Ok(light) = index.entity::<kind::Light>(system_id) else {
                    return Mutation::new();
                };
                let Some((show, speed, brightness)) =
                    resolve_show(light.telemetry(), *show, *speed, *brightness)
                else {
                    return Mutation::new();
                };
                let mut mutation = Mutation::new()
                    .telemetry(TelemetryField::LightShow(show))
                    .telemetry(TelemetryField::LightSpeed(speed))
                    .telemetry(TelemetryField::LightBrightness(brightness));
                if light_state(index, system_id) == Some(ColorLogicPowerState::Off) {
                    mutation = mutation.telemetry(TelemetryField::LightState(
                        ColorLogicPowerState::FifteenSecondsWhite,
                    ));
                }
                mutation
            }

            (Self::SetHeaterTemperature { temperature }, OmniType::VirtualHeater) => Mutation::new()
                .telemetry(TelemetryField::HeaterSetPoint(*temperature))
                .config(ConfigField::HeaterSetPoint(*temperature)),
            (Self::SetHeaterEnabled { enabled }, OmniType::VirtualHeater) => Mutation::new()
                .telemetry(TelemetryField::HeaterEnabled(*enabled))
                .config(ConfigField::HeaterEnabled(*enabled)),

            (Self::TurnOn | Self::TurnOff, OmniType::Chlorinator) => Mutation::new()
                .telemetry(TelemetryField::ChlorinatorEnabled(matches!(self, Self::TurnOn))),

            _ => Mutation::new(),
        }
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetSpeedPreset { .. } => "set_speed_preset",
            Self::SetLightShow { .. } => "set_light_show",
            Self::SetHeaterTemperature { .. } => "set_heater_temperature",
            Self::SetHeaterEnabled { .. } => "set_heater_enabled",
            Self::RestoreIdle => "restore_idle",
        }
    }

    fn target_speed(&self, index: &EntityIndex, system_id: SystemId) -> Result<i64, CoreError> {
        let limits = speed_limits(index, system_id)?;
        let percent = match self {
            Self::SetSpeed { percent } => *percent,
            Self::SetSpeedPreset { preset } => {
                limits.preset(*preset).ok_or_else(|| CoreError::Rejected {
                    message: format!("device {system_id} has no {preset} speed preset"),
                })?
            }
            _ => {
                return Err(CoreError::Rejected {
                    message: format!("{} does not carry a speed", self.name()),
                });
            }
        };
        if !limits.accepts_percent(percent) {
            return Err(CoreError::Rejected {
                message: format!(
                    "speed {percent}% is outside {}..={} for device {system_id}",
                    limits.min_percent, limits.max_percent
                ),
            });
        }
        Ok(percent)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn speed_limits(index: &EntityIndex, system_id: SystemId) -> Result<&SpeedLimits, CoreError> {
    match index.entity::<kind::Filter>(system_id) {
        Ok(filter) => Ok(&filter.config().speeds),
        Err(_) => Ok(&index.entity::<kind::Pump>(system_id)?.config().speeds),
    }
}

/// Variable-speed equipment comes back at the speed it last ran at.
fn resume_speed(index: &EntityIndex, system_id: SystemId) -> Option<i64> {
    match index.entity::<kind::Filter>(system_id) {
        Ok(filter) => filter.last_speed(),
        Err(_) => index.entity::<kind::Pump>(system_id).ok()?.last_speed(),
    }
}

fn light_state(index: &EntityIndex, system_id: SystemId) -> Option<ColorLogicPowerState> {
    index
        .entity::<kind::Light>(system_id)
        .ok()?
        .telemetry()
        .map(|t| t.state)
}

fn ensure_light_accepts(index: &EntityIndex, system_id: SystemId) -> Result<(), CoreError> {
    let light = index.entity::<kind::Light>(system_id)?;
    if light.accepts_power_on() {
        return Ok(());
    }
    let state = light
        .telemetry()
        .map_or_else(|| "unknown".to_owned(), |t| t.state.to_string());
    Err(CoreError::Rejected {
        message: format!("light {system_id} is {state} and cannot be turned on yet"),
    })
}

/// Fill unspecified show settings from the light's current state.
fn resolve_show(
    current: Option<&LightTelemetry>,
    show: Option<ColorLogicShow>,
    speed: Option<ColorLogicSpeed>,
    brightness: Option<ColorLogicBrightness>,
) -> Option<(ColorLogicShow, ColorLogicSpeed, ColorLogicBrightness)> {
    Some((
        show.or(current.map(|t| t.show))?,
        speed.or(current.map(|t| t.speed))?,
        brightness.or(current.map(|t| t.brightness))?,
    ))
}
