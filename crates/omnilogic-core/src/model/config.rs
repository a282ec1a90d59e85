// ── Configuration records ──
//
// The equipment catalog as a typed tree. Payload structs deserialize
// straight from the normalized XML tree (underscored element names)
// and serialize back out with snake_case field names.

use serde::{Deserialize, Serialize};

use super::SystemId;
use super::omni_type::OmniType;
use crate::parse::de;

// ── Tree ─────────────────────────────────────────────────────────────

/// Parsed `<MSPConfig>` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MspConfig {
    pub system: SystemConfig,
    pub backyard: ConfigNode,
    pub checksum: Option<String>,
}

/// A device record plus the sub-devices nested beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigNode {
    pub device: DeviceConfig,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn leaf(device: DeviceConfig) -> Self {
        Self {
            device,
            children: Vec::new(),
        }
    }
}

/// One addressable device, without its nested sub-device lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceConfig {
    pub system_id: SystemId,
    pub name: String,
    /// Owning body of water; `None` for backyard-level devices.
    pub bow_id: Option<SystemId>,
    pub payload: ConfigPayload,
}

impl DeviceConfig {
    pub fn omni_type(&self) -> OmniType {
        self.payload.omni_type()
    }
}

/// Kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "omni_type", rename_all = "snake_case")]
pub enum ConfigPayload {
    Backyard(BackyardConfig),
    BodyOfWater(BodyOfWaterConfig),
    Filter(FilterConfig),
    Pump(PumpConfig),
    Relay(RelayConfig),
    ColorLogicLight(LightConfig),
    Sensor(SensorConfig),
    VirtualHeater(VirtualHeaterConfig),
    HeaterEquipment(HeaterEquipmentConfig),
    Chlorinator(ChlorinatorConfig),
    ChlorinatorEquipment(ChlorinatorEquipmentConfig),
    Csad(CsadConfig),
}

impl ConfigPayload {
    pub fn omni_type(&self) -> OmniType {
        match self {
            Self::Backyard(_) => OmniType::Backyard,
            Self::BodyOfWater(_) => OmniType::BodyOfWater,
            Self::Filter(_) => OmniType::Filter,
            Self::Pump(_) => OmniType::Pump,
            Self::Relay(relay) if relay.relay_type == RelayType::ValveActuator => {
                OmniType::ValveActuator
            }
            Self::Relay(_) => OmniType::Relay,
            Self::ColorLogicLight(_) => OmniType::ColorLogicLight,
            Self::Sensor(_) => OmniType::Sensor,
            Self::VirtualHeater(_) => OmniType::VirtualHeater,
            Self::HeaterEquipment(_) => OmniType::HeaterEquipment,
            Self::Chlorinator(_) => OmniType::Chlorinator,
            Self::ChlorinatorEquipment(_) => OmniType::ChlorinatorEquipment,
            Self::Csad(_) => OmniType::Csad,
        }
    }
}

// ── System block ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedFormat {
    #[default]
    Percent,
    #[serde(rename = "RPM")]
    Rpm,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Standard,
    Metric,
    #[serde(other)]
    Unknown,
}

/// Controller-wide display preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(rename(deserialize = "Msp_Vsp_Speed_Format"), default)]
    pub speed_format: SpeedFormat,
    #[serde(rename(deserialize = "Units"), default)]
    pub units: UnitSystem,
    #[serde(
        rename(deserialize = "Msp_Chlor_Display"),
        default,
        deserialize_with = "de::opt_text"
    )]
    pub chlor_display: Option<String>,
}

// ── Backyard and bodies of water ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackyardConfig {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyOfWaterType {
    #[serde(rename = "BOW_POOL")]
    Pool,
    #[serde(rename = "BOW_SPA")]
    Spa,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyOfWaterConfig {
    #[serde(rename(deserialize = "Type"), default)]
    pub body_type: BodyOfWaterType,
    #[serde(
        rename(deserialize = "Supports_Spillover"),
        default,
        deserialize_with = "de::yes_no"
    )]
    pub supports_spillover: bool,
    #[serde(rename(deserialize = "Size_In_Gallons"), default)]
    pub size_in_gallons: Option<i64>,
}

// ── Pumps and filters ────────────────────────────────────────────────

/// Speed bounds and presets shared by filters and pumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedLimits {
    #[serde(rename(deserialize = "Max_Pump_Speed"), default = "default_max_percent")]
    pub max_percent: i64,
    #[serde(rename(deserialize = "Min_Pump_Speed"), default = "default_min_percent")]
    pub min_percent: i64,
    #[serde(rename(deserialize = "Max_Pump_RPM"), default = "default_max_rpm")]
    pub max_rpm: i64,
    #[serde(rename(deserialize = "Min_Pump_RPM"), default = "default_min_rpm")]
    pub min_rpm: i64,
    #[serde(rename(deserialize = "Vsp_Low_Pump_Speed"), default)]
    pub low_speed: Option<i64>,
    #[serde(rename(deserialize = "Vsp_Medium_Pump_Speed"), default)]
    pub medium_speed: Option<i64>,
    #[serde(rename(deserialize = "Vsp_High_Pump_Speed"), default)]
    pub high_speed: Option<i64>,
    #[serde(rename(deserialize = "Vsp_Custom_Pump_Speed"), default)]
    pub custom_speed: Option<i64>,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            max_percent: default_max_percent(),
            min_percent: default_min_percent(),
            max_rpm: default_max_rpm(),
            min_rpm: default_min_rpm(),
            low_speed: None,
            medium_speed: None,
            high_speed: None,
            custom_speed: None,
        }
    }
}

fn default_max_percent() -> i64 {
    100
}
fn default_min_percent() -> i64 {
    18
}
fn default_max_rpm() -> i64 {
    3450
}
fn default_min_rpm() -> i64 {
    600
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    #[serde(rename = "FMT_VARIABLE_SPEED_PUMP")]
    VariableSpeed,
    #[serde(rename = "FMT_DUAL_SPEED")]
    DualSpeed,
    #[serde(rename = "FMT_SINGLE_SPEED")]
    SingleSpeed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(rename(deserialize = "Filter_Type"), default)]
    pub filter_type: FilterType,
    #[serde(
        rename(deserialize = "Priming_Enabled"),
        default,
        deserialize_with = "de::yes_no"
    )]
    pub priming_enabled: bool,
    #[serde(flatten)]
    pub speeds: SpeedLimits,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpType {
    #[serde(rename = "PMP_VARIABLE_SPEED_PUMP")]
    VariableSpeed,
    #[serde(rename = "PMP_DUAL_SPEED")]
    DualSpeed,
    #[serde(rename = "PMP_SINGLE_SPEED")]
    SingleSpeed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpFunction {
    #[serde(rename = "PMP_PUMP")]
    Pump,
    #[serde(rename = "PMP_WATER_FEATURE")]
    WaterFeature,
    #[serde(rename = "PMP_CLEANER")]
    Cleaner,
    #[serde(rename = "PMP_WATER_SLIDE")]
    WaterSlide,
    #[serde(rename = "PMP_WATERFALL")]
    Waterfall,
    #[serde(rename = "PMP_FOUNTAIN")]
    Fountain,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    #[serde(rename(deserialize = "Type"), default)]
    pub pump_type: PumpType,
    #[serde(rename(deserialize = "Function"), default)]
    pub function: PumpFunction,
    #[serde(flatten)]
    pub speeds: SpeedLimits,
}

// ── Relays and lights ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayType {
    #[serde(rename = "RLY_HIGH_VOLTAGE_RELAY")]
    HighVoltage,
    #[serde(rename = "RLY_LOW_VOLTAGE_RELAY")]
    LowVoltage,
    #[serde(rename = "RLY_VALVE_ACTUATOR")]
    ValveActuator,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayFunction {
    #[serde(rename = "RLY_WATERFALL")]
    Waterfall,
    #[serde(rename = "RLY_FOUNTAIN")]
    Fountain,
    #[serde(rename = "RLY_WATER_FEATURE")]
    WaterFeature,
    #[serde(rename = "RLY_WATER_SLIDE")]
    WaterSlide,
    #[serde(rename = "RLY_LIGHT")]
    Light,
    #[serde(rename = "RLY_CLEANER")]
    Cleaner,
    #[serde(rename = "RLY_ACCESSORY")]
    Accessory,
    #[serde(rename = "RLY_BACKYARD_LIGHT")]
    BackyardLight,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(rename(deserialize = "Type"), default)]
    pub relay_type: RelayType,
    #[serde(rename(deserialize = "Function"), default)]
    pub function: RelayFunction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorLogicLightType {
    #[serde(rename = "COLOR_LOGIC_UCL")]
    Ucl,
    #[serde(rename = "COLOR_LOGIC_2_5")]
    TwoFive,
    #[serde(rename = "COLOR_LOGIC_4_0")]
    FourZero,
    #[serde(rename = "COLOR_LOGIC_SAM")]
    Sam,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(rename(deserialize = "Type"), default)]
    pub light_type: ColorLogicLightType,
    #[serde(rename(deserialize = "V2_Active"), default, deserialize_with = "de::yes_no")]
    pub v2_active: bool,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorType {
    #[serde(rename = "SENSOR_AIR_TEMP")]
    AirTemp,
    #[serde(rename = "SENSOR_WATER_TEMP")]
    WaterTemp,
    #[serde(rename = "SENSOR_SOLAR_TEMP")]
    SolarTemp,
    #[serde(rename = "SENSOR_FLOW")]
    Flow,
    #[serde(rename = "SENSOR_ORP")]
    Orp,
    #[serde(rename = "SENSOR_EXT_INPUT")]
    ExternalInput,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorUnits {
    #[serde(rename = "UNITS_FAHRENHEIT")]
    Fahrenheit,
    #[serde(rename = "UNITS_CELSIUS")]
    Celsius,
    #[serde(rename = "UNITS_PPM")]
    Ppm,
    #[serde(rename = "UNITS_GRAMS_PER_LITER")]
    GramsPerLiter,
    #[serde(rename = "UNITS_MILLIVOLTS")]
    Millivolts,
    #[serde(rename = "UNITS_ACTIVE_INACTIVE")]
    ActiveInactive,
    #[serde(rename = "UNITS_NO_UNITS")]
    NoUnits,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(rename(deserialize = "Type"), default)]
    pub sensor_type: SensorType,
    #[serde(rename(deserialize = "Units"), default)]
    pub units: SensorUnits,
}

// ── Heaters ──────────────────────────────────────────────────────────

/// User-facing heater control for one body of water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualHeaterConfig {
    #[serde(rename(deserialize = "Enabled"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "Current_Set_Point"), default)]
    pub current_set_point: Option<i64>,
    #[serde(rename(deserialize = "SolarSetPoint"), default)]
    pub solar_set_point: Option<i64>,
    #[serde(rename(deserialize = "Min_Settable_Water_Temp"), default = "default_min_temp")]
    pub min_temp: i64,
    #[serde(rename(deserialize = "Max_Settable_Water_Temp"), default = "default_max_temp")]
    pub max_temp: i64,
    #[serde(rename(deserialize = "Max_Water_Temp"), default)]
    pub max_water_temp: Option<i64>,
}

impl Default for VirtualHeaterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            current_set_point: None,
            solar_set_point: None,
            min_temp: default_min_temp(),
            max_temp: default_max_temp(),
            max_water_temp: None,
        }
    }
}

fn default_min_temp() -> i64 {
    65
}
fn default_max_temp() -> i64 {
    104
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaterType {
    #[serde(rename = "HTR_GAS")]
    Gas,
    #[serde(rename = "HTR_HEAT_PUMP")]
    HeatPump,
    #[serde(rename = "HTR_SOLAR")]
    Solar,
    #[serde(rename = "HTR_ELECTRIC")]
    Electric,
    #[serde(rename = "HTR_GEOTHERMAL")]
    Geothermal,
    #[serde(rename = "HTR_SMART")]
    Smart,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One physical heating element driven by a virtual heater.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaterEquipmentConfig {
    #[serde(rename(deserialize = "Heater_Type"), default)]
    pub heater_type: HeaterType,
    #[serde(rename(deserialize = "Enabled"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "Min_Speed_For_Operation"), default)]
    pub min_filter_speed: Option<i64>,
    #[serde(rename(deserialize = "Sensor_System_Id"), default)]
    pub sensor_system_id: Option<SystemId>,
    #[serde(
        rename(deserialize = "Supports_Cooling"),
        default,
        deserialize_with = "de::yes_no"
    )]
    pub supports_cooling: bool,
    /// The virtual heater this element was nested under.
    #[serde(skip_deserializing)]
    pub heater_id: Option<SystemId>,
}

// ── Chemistry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChlorinatorDispenserType {
    #[serde(rename = "SALT_DISPENSING")]
    Salt,
    #[serde(rename = "TABLET_DISPENSING")]
    Tablet,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChlorinatorConfig {
    #[serde(rename(deserialize = "Enabled"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "Timed_Percent"), default)]
    pub timed_percent: Option<i64>,
    #[serde(rename(deserialize = "Superchlor_Timeout"), default)]
    pub superchlor_timeout: Option<i64>,
    #[serde(rename(deserialize = "Dispenser_Type"), default)]
    pub dispenser_type: ChlorinatorDispenserType,
    #[serde(rename(deserialize = "Cell_Type"), default, deserialize_with = "de::opt_text")]
    pub cell_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChlorinatorEquipmentConfig {
    #[serde(rename(deserialize = "Enabled"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(
        rename(deserialize = "Chlorinator_Type"),
        default,
        deserialize_with = "de::opt_text"
    )]
    pub equipment_type: Option<String>,
    #[serde(skip_deserializing)]
    pub chlorinator_id: Option<SystemId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsadType {
    #[serde(rename = "ACID")]
    Acid,
    #[serde(rename = "CO2")]
    Co2,
    #[default]
    #[serde(other)]
    Unknown,
}

/// pH / ORP controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsadConfig {
    #[serde(rename(deserialize = "Enabled"), default, deserialize_with = "de::yes_no")]
    pub enabled: bool,
    #[serde(rename(deserialize = "Type"), default)]
    pub csad_type: CsadType,
    #[serde(rename(deserialize = "TargetValue"), default, deserialize_with = "de::opt_f64")]
    pub target_value: Option<f64>,
    #[serde(
        rename(deserialize = "CalibrationValue"),
        default,
        deserialize_with = "de::lenient_f64"
    )]
    pub calibration_value: f64,
    #[serde(rename(deserialize = "PHLowAlarmLevel"), default, deserialize_with = "de::opt_f64")]
    pub ph_low_alarm: Option<f64>,
    #[serde(rename(deserialize = "PHHighAlarmLevel"), default, deserialize_with = "de::opt_f64")]
    pub ph_high_alarm: Option<f64>,
}
