// ── Domain model ──
//
// Typed configuration and telemetry records. Both axes are tagged
// unions over the device kind; readers narrow before touching any
// kind-specific field.

pub mod codes;
pub mod config;
pub mod omni_type;
pub mod sentinel;
pub mod telemetry;

pub use codes::{
    BackyardState, ColorLogicBrightness, ColorLogicPowerState, ColorLogicShow, ColorLogicSpeed,
    FilterState, HeaterState, PumpState, RelayState, ValveActuatorState,
};
pub use config::{
    BackyardConfig, BodyOfWaterConfig, BodyOfWaterType, ChlorinatorConfig,
    ChlorinatorDispenserType, ChlorinatorEquipmentConfig, ColorLogicLightType, ConfigNode,
    ConfigPayload, CsadConfig, CsadType, DeviceConfig, FilterConfig, FilterType,
    HeaterEquipmentConfig, HeaterType, LightConfig, MspConfig, PumpConfig, PumpFunction, PumpType,
    RelayConfig, RelayFunction, RelayType, SensorConfig, SensorType, SensorUnits, SpeedFormat,
    SpeedLimits, SystemConfig, UnitSystem, VirtualHeaterConfig,
};
pub use omni_type::{OmniType, Platform};
pub use sentinel::SentinelField;
pub use telemetry::{
    BackyardTelemetry, BodyOfWaterTelemetry, ChlorinatorTelemetry, CsadTelemetry, DeviceTelemetry,
    FilterTelemetry, GroupTelemetry, HeaterTelemetry, LightTelemetry, PumpTelemetry,
    RelayTelemetry, Telemetry, ValveActuatorTelemetry, VirtualHeaterTelemetry,
};

/// Controller-assigned identifier shared by configuration and telemetry.
pub type SystemId = i64;

/// The backyard root always carries this id.
pub const BACKYARD_SYSTEM_ID: SystemId = 0;
