// ── Controller collaborator ──
//
// The network client is out of this crate's hands. The coordinator only
// needs raw payloads in and wire-neutral command requests out.

use std::future::Future;

use bytes::Bytes;
use serde::Serialize;

use crate::error::ApiError;
use crate::model::{ColorLogicBrightness, ColorLogicShow, ColorLogicSpeed, SystemId};

/// Temperature unit a heater set point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[strum(serialize = "F")]
    Fahrenheit,
    #[strum(serialize = "C")]
    Celsius,
}

/// On/off or a variable speed in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentValue {
    On(bool),
    Speed(i64),
}

/// A control request, independent of how the client frames it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum CommandRequest {
    SetEquipment {
        is_on: EquipmentValue,
    },
    SetLightShow {
        show: ColorLogicShow,
        speed: ColorLogicSpeed,
        brightness: ColorLogicBrightness,
    },
    SetHeater {
        temperature: i64,
        unit: TemperatureUnit,
    },
    SetHeaterEnable {
        enabled: bool,
    },
    SetChlorinatorEnable {
        enabled: bool,
    },
    RestoreIdle,
}

/// The wire-protocol client the coordinator drives.
///
/// Implementations own framing, retries and socket timeouts; every
/// failure is reported as an [`ApiError`].
pub trait OmniApi: Send + Sync + 'static {
    /// Raw `<MSPConfig>` payload.
    fn fetch_configuration(&self) -> impl Future<Output = Result<Bytes, ApiError>> + Send;

    /// Raw `<STATUS>` payload.
    fn fetch_telemetry(&self) -> impl Future<Output = Result<Bytes, ApiError>> + Send;

    fn send_command(
        &self,
        bow_id: Option<SystemId>,
        system_id: SystemId,
        request: CommandRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
