// ── Index-backed entities ──
//
// One generic handle narrows an index entry to a specific device kind
// and exposes the shared accessors every consumer needs. Kind-specific
// readings live in per-kind `impl` blocks below.

use std::fmt;
use std::marker::PhantomData;

use crate::error::CoreError;
use crate::index::{EntityIndex, EntityIndexEntry};
use crate::model::sentinel::{self, SentinelField};
use crate::model::{
    BACKYARD_SYSTEM_ID, BackyardState, ColorLogicShow, ConfigPayload, DeviceConfig,
    DeviceTelemetry, HeaterState, OmniType, PumpState, RelayState, SensorType, SpeedLimits, SystemId,
    ValveActuatorState,
};

/// Narrowing rules for one device kind.
pub trait DeviceKind {
    type Config: 'static;
    type Telemetry: 'static;

    /// Label used in `WrongDeviceKind` errors.
    const NAME: &'static str;

    fn config(payload: &ConfigPayload) -> Option<&Self::Config>;

    fn telemetry(telemetry: &DeviceTelemetry) -> Option<&Self::Telemetry>;

    /// Extra discriminant check for kinds that share a payload variant.
    fn accepts(omni_type: OmniType) -> bool;
}

/// Marker types for [`IndexedEntity`].
pub mod kind {
    use std::convert::Infallible;

    use super::DeviceKind;
    use crate::model::{
        BackyardConfig, BackyardTelemetry, BodyOfWaterConfig, BodyOfWaterTelemetry,
        ChlorinatorConfig, ChlorinatorTelemetry, ConfigPayload, CsadConfig, CsadTelemetry,
        DeviceTelemetry, FilterConfig, FilterTelemetry, HeaterEquipmentConfig, HeaterTelemetry,
        LightConfig, LightTelemetry, OmniType, PumpConfig, PumpTelemetry, RelayConfig,
        RelayTelemetry, SensorConfig, ValveActuatorTelemetry, VirtualHeaterConfig,
        VirtualHeaterTelemetry,
    };

    macro_rules! device_kind {
        ($kind:ident, $name:literal, $omni:ident, $cfg_variant:ident($cfg:ty), $tel:ty, $tel_pat:pat => $tel_out:expr) => {
            #[derive(Debug, Clone, Copy)]
            pub struct $kind;

            impl DeviceKind for $kind {
                type Config = $cfg;
                type Telemetry = $tel;
                const NAME: &'static str = $name;

                fn config(payload: &ConfigPayload) -> Option<&Self::Config> {
                    match payload {
                        ConfigPayload::$cfg_variant(config) => Some(config),
                        _ => None,
                    }
                }

                fn telemetry(telemetry: &DeviceTelemetry) -> Option<&Self::Telemetry> {
                    match telemetry {
                        $tel_pat => Some($tel_out),
                        _ => None,
                    }
                }

                fn accepts(omni_type: OmniType) -> bool {
                    omni_type == OmniType::$omni
                }
            }
        };
    }

    device_kind!(Backyard, "backyard", Backyard, Backyard(BackyardConfig), BackyardTelemetry,
        DeviceTelemetry::Backyard(t) => t);
    device_kind!(BodyOfWater, "body of water", BodyOfWater, BodyOfWater(BodyOfWaterConfig),
        BodyOfWaterTelemetry, DeviceTelemetry::BodyOfWater(t) => t);
    device_kind!(Filter, "filter", Filter, Filter(FilterConfig), FilterTelemetry,
        DeviceTelemetry::Filter(t) => t);
    device_kind!(Pump, "pump", Pump, Pump(PumpConfig), PumpTelemetry,
        DeviceTelemetry::Pump(t) => t);
    device_kind!(Relay, "relay", Relay, Relay(RelayConfig), RelayTelemetry,
        DeviceTelemetry::Relay(t) => t);
    device_kind!(ValveActuator, "valve actuator", ValveActuator, Relay(RelayConfig),
        ValveActuatorTelemetry, DeviceTelemetry::ValveActuator(t) => t);
    device_kind!(Light, "light", ColorLogicLight, ColorLogicLight(LightConfig), LightTelemetry,
        DeviceTelemetry::ColorLogicLight(t) => t);
    device_kind!(VirtualHeater, "heater", VirtualHeater, VirtualHeater(VirtualHeaterConfig),
        VirtualHeaterTelemetry, DeviceTelemetry::VirtualHeater(t) => t);
    device_kind!(HeaterEquipment, "heater equipment", HeaterEquipment,
        HeaterEquipment(HeaterEquipmentConfig), HeaterTelemetry, DeviceTelemetry::Heater(t) => t);
    device_kind!(Chlorinator, "chlorinator", Chlorinator, Chlorinator(ChlorinatorConfig),
        ChlorinatorTelemetry, DeviceTelemetry::Chlorinator(t) => t);
    device_kind!(Csad, "CSAD", Csad, Csad(CsadConfig), CsadTelemetry,
        DeviceTelemetry::Csad(t) => t);

    /// Sensors carry no telemetry of their own; see `IndexedEntity::reading`.
    #[derive(Debug, Clone, Copy)]
    pub struct Sensor;

    impl DeviceKind for Sensor {
        type Config = SensorConfig;
        type Telemetry = Infallible;
        const NAME: &'static str = "sensor";

        fn config(payload: &ConfigPayload) -> Option<&Self::Config> {
            match payload {
                ConfigPayload::Sensor(config) => Some(config),
                _ => None,
            }
        }

        fn telemetry(_: &DeviceTelemetry) -> Option<&Self::Telemetry> {
            None
        }

        fn accepts(omni_type: OmniType) -> bool {
            omni_type == OmniType::Sensor
        }
    }
}

// ── Generic handle ───────────────────────────────────────────────────

/// An index entry narrowed to kind `K`.
pub struct IndexedEntity<'a, K: DeviceKind> {
    index: &'a EntityIndex,
    entry: &'a EntityIndexEntry,
    config: &'a K::Config,
    _kind: PhantomData<K>,
}

impl<K: DeviceKind> Clone for IndexedEntity<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: DeviceKind> Copy for IndexedEntity<'_, K> {}

impl<K: DeviceKind> fmt::Debug for IndexedEntity<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedEntity")
            .field("kind", &K::NAME)
            .field("system_id", &self.system_id())
            .field("name", &self.name())
            .finish()
    }
}

impl<'a, K: DeviceKind> IndexedEntity<'a, K> {
    pub fn new(index: &'a EntityIndex, system_id: SystemId) -> Result<Self, CoreError> {
        let entry = index
            .get(system_id)
            .ok_or(CoreError::UnknownDevice { system_id })?;
        let actual = entry.omni_type();
        let config = K::config(&entry.msp_config.payload)
            .filter(|_| K::accepts(actual))
            .ok_or_else(|| CoreError::wrong_kind(system_id, K::NAME, actual))?;
        Ok(Self {
            index,
            entry,
            config,
            _kind: PhantomData,
        })
    }

    pub fn entry(&self) -> &'a EntityIndexEntry {
        self.entry
    }

    pub fn device(&self) -> &'a DeviceConfig {
        &self.entry.msp_config
    }

    pub fn config(&self) -> &'a K::Config {
        self.config
    }

    /// Live state, if the controller reported any for this device.
    pub fn telemetry(&self) -> Option<&'a K::Telemetry> {
        self.entry.telemetry.as_ref().and_then(K::telemetry)
    }

    pub fn system_id(&self) -> SystemId {
        self.entry.msp_config.system_id
    }

    pub fn bow_id(&self) -> Option<SystemId> {
        self.entry.msp_config.bow_id
    }

    pub fn name(&self) -> &'a str {
        &self.entry.msp_config.name
    }

    /// The device this entity is grouped under: its body of water, or
    /// the backyard.
    pub fn device_association(&self) -> SystemId {
        self.bow_id().unwrap_or(BACKYARD_SYSTEM_ID)
    }

    pub fn unique_id(&self) -> String {
        let bow = self
            .bow_id()
            .map_or_else(|| "none".to_owned(), |id| id.to_string());
        format!("{bow} {} {}", self.system_id(), self.name())
    }

    /// Entities are only available while the backyard reports ON.
    pub fn available(&self) -> bool {
        matches!(
            self.index.backyard().and_then(|e| e.telemetry.as_ref()),
            Some(DeviceTelemetry::Backyard(t)) if t.state == BackyardState::On
        )
    }

    fn body_of_water(&self) -> Option<IndexedEntity<'a, kind::BodyOfWater>> {
        self.bow_id()
            .and_then(|id| IndexedEntity::new(self.index, id).ok())
    }
}

impl EntityIndex {
    /// Narrow the entry for `system_id` to kind `K`.
    pub fn entity<K: DeviceKind>(&self, system_id: SystemId) -> Result<IndexedEntity<'_, K>, CoreError> {
        IndexedEntity::new(self, system_id)
    }
}

// ── Backyard ─────────────────────────────────────────────────────────

impl IndexedEntity<'_, kind::Backyard> {
    /// Service, config and timed service mode. Meaningful exactly when
    /// [`available`](Self::available) is false, so consumers read it
    /// regardless of availability.
    pub fn in_service_mode(&self) -> bool {
        self.telemetry().is_some_and(|t| {
            matches!(
                t.state,
                BackyardState::ServiceMode | BackyardState::ConfigMode | BackyardState::TimedServiceMode
            )
        })
    }
}

// ── Pumps and filters ────────────────────────────────────────────────

/// Named speed presets from the pump configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpeedPreset {
    Low,
    Medium,
    High,
}

impl SpeedLimits {
    pub fn preset(&self, preset: SpeedPreset) -> Option<i64> {
        match preset {
            SpeedPreset::Low => self.low_speed,
            SpeedPreset::Medium => self.medium_speed,
            SpeedPreset::High => self.high_speed,
        }
    }

    /// `None` when the product does not fit an `i64`.
    pub fn percent_to_rpm(&self, percent: i64) -> Option<i64> {
        percent.checked_mul(self.max_rpm).map(|rpm| rpm / 100)
    }

    pub fn accepts_percent(&self, percent: i64) -> bool {
        (self.min_percent..=self.max_percent).contains(&percent)
    }
}

impl IndexedEntity<'_, kind::Filter> {
    pub fn is_on(&self) -> bool {
        self.telemetry().is_some_and(|t| t.state.is_running())
    }

    pub fn speed_percent(&self) -> Option<i64> {
        self.telemetry().map(|t| t.speed)
    }

    /// Speed the filter ran at before it last stopped.
    pub fn last_speed(&self) -> Option<i64> {
        self.telemetry()?.last_speed
    }

    pub fn speed_rpm(&self) -> Option<i64> {
        self.speed_percent()
            .and_then(|percent| self.config().speeds.percent_to_rpm(percent))
    }

    pub fn preset_speed(&self, preset: SpeedPreset) -> Option<i64> {
        self.config().speeds.preset(preset)
    }

    /// Filters keep reporting their last power draw after stopping.
    pub fn power_watts(&self) -> Option<i64> {
        let telemetry = self.telemetry()?;
        if telemetry.state.is_running() {
            telemetry.power
        } else {
            Some(0)
        }
    }
}

impl IndexedEntity<'_, kind::Pump> {
    pub fn is_on(&self) -> bool {
        self.telemetry().is_some_and(|t| t.state == PumpState::On)
    }

    pub fn speed_percent(&self) -> Option<i64> {
        self.telemetry().map(|t| t.speed)
    }

    pub fn last_speed(&self) -> Option<i64> {
        self.telemetry()?.last_speed
    }

    pub fn speed_rpm(&self) -> Option<i64> {
        self.speed_percent()
            .and_then(|percent| self.config().speeds.percent_to_rpm(percent))
    }

    pub fn preset_speed(&self, preset: SpeedPreset) -> Option<i64> {
        self.config().speeds.preset(preset)
    }
}

// ── Relays and lights ────────────────────────────────────────────────

impl IndexedEntity<'_, kind::Relay> {
    pub fn is_on(&self) -> bool {
        self.telemetry().is_some_and(|t| t.state == RelayState::On)
    }
}

impl IndexedEntity<'_, kind::ValveActuator> {
    pub fn is_on(&self) -> bool {
        self.telemetry()
            .is_some_and(|t| t.state == ValveActuatorState::On)
    }
}

impl IndexedEntity<'_, kind::Light> {
    pub fn is_on(&self) -> bool {
        self.telemetry().is_some_and(|t| t.state.is_lit())
    }

    /// Brightness scaled to 0-255.
    pub fn brightness_255(&self) -> Option<i64> {
        self.telemetry().and_then(|t| t.brightness.to_level_255())
    }

    pub fn show(&self) -> Option<ColorLogicShow> {
        self.telemetry().map(|t| t.show)
    }

    /// A light that is powering off or cooling down ignores power-on.
    pub fn accepts_power_on(&self) -> bool {
        !self.telemetry().is_some_and(|t| t.state.is_winding_down())
    }
}

// ── Sensors ──────────────────────────────────────────────────────────

impl IndexedEntity<'_, kind::Sensor> {
    /// Current reading of whatever this sensor is wired to, with
    /// sentinels resolved to `None`.
    pub fn reading(&self) -> Option<i64> {
        match self.config().sensor_type {
            SensorType::AirTemp => {
                let backyard = self.index.entity::<kind::Backyard>(BACKYARD_SYSTEM_ID).ok()?;
                sentinel::reading(SentinelField::AirTemp, backyard.telemetry()?.air_temp)
            }
            SensorType::WaterTemp => {
                let bow = self.body_of_water()?;
                sentinel::reading(SentinelField::WaterTemp, bow.telemetry()?.water_temp)
            }
            SensorType::Flow => {
                let bow = self.body_of_water()?;
                sentinel::reading(SentinelField::Flow, bow.telemetry()?.flow)
            }
            SensorType::SolarTemp => {
                let entry = self.index.solar_heater_for_sensor(self.system_id())?;
                let heater = self.index.entity::<kind::HeaterEquipment>(entry.system_id()).ok()?;
                heater.temperature()
            }
            SensorType::Orp | SensorType::ExternalInput | SensorType::Unknown => None,
        }
    }
}

// ── Heaters ──────────────────────────────────────────────────────────

impl IndexedEntity<'_, kind::VirtualHeater> {
    /// Set point, preferring live state over the configured value.
    pub fn target_temperature(&self) -> Option<i64> {
        self.telemetry()
            .and_then(|t| t.current_set_point)
            .or(self.config().current_set_point)
    }

    pub fn current_temperature(&self) -> Option<i64> {
        let bow = self.body_of_water()?;
        sentinel::reading(SentinelField::WaterTemp, bow.telemetry()?.water_temp)
    }

    pub fn is_enabled(&self) -> bool {
        self.telemetry()
            .map_or(self.config().enabled, |t| t.enabled)
    }

    pub fn min_temp(&self) -> i64 {
        self.config().min_temp
    }

    pub fn max_temp(&self) -> i64 {
        self.config().max_temp
    }

    pub fn equipment(&self) -> Vec<&EntityIndexEntry> {
        self.index.heater_equipment_of(self.system_id())
    }
}

impl IndexedEntity<'_, kind::HeaterEquipment> {
    pub fn temperature(&self) -> Option<i64> {
        sentinel::reading(SentinelField::HeaterTemp, self.telemetry()?.temp)
    }

    pub fn is_heating(&self) -> bool {
        self.telemetry().is_some_and(|t| t.state == HeaterState::On)
    }
}

// ── Chemistry ────────────────────────────────────────────────────────

impl IndexedEntity<'_, kind::Chlorinator> {
    pub fn average_salt_level(&self) -> Option<i64> {
        self.telemetry()?.avg_salt_level
    }

    pub fn instant_salt_level(&self) -> Option<i64> {
        self.telemetry()?.instant_salt_level
    }
}

impl IndexedEntity<'_, kind::Csad> {
    /// Reported pH corrected by the configured calibration offset.
    pub fn ph(&self) -> Option<f64> {
        self.telemetry()?
            .ph
            .map(|ph| ph + self.config().calibration_value)
    }

    pub fn orp(&self) -> Option<i64> {
        self.telemetry()?.orp
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse::{parse_config, parse_telemetry};

    const CONFIG: &[u8] = br"<MSPConfig><Backyard>
        <System-Id>0</System-Id>
        <Sensor><System-Id>16</System-Id><Name>Air</Name><Type>SENSOR_AIR_TEMP</Type></Sensor>
        <Body-of-water>
          <System-Id>1</System-Id><Name>Pool</Name>
          <Filter>
            <System-Id>3</System-Id><Name>Filter Pump</Name>
            <Max-Pump-RPM>3000</Max-Pump-RPM>
            <Vsp-Low-Pump-Speed>40</Vsp-Low-Pump-Speed>
          </Filter>
          <ColorLogic-Light><System-Id>9</System-Id><Name>Pool Light</Name></ColorLogic-Light>
          <Sensor><System-Id>17</System-Id><Name>Solar</Name><Type>SENSOR_SOLAR_TEMP</Type></Sensor>
          <Sensor><System-Id>18</System-Id><Name>Water</Name><Type>SENSOR_WATER_TEMP</Type></Sensor>
          <Sensor><System-Id>19</System-Id><Name>Flow</Name><Type>SENSOR_FLOW</Type></Sensor>
          <Heater>
            <System-Id>4</System-Id>
            <Enabled>yes</Enabled>
            <Current-Set-Point>82</Current-Set-Point>
            <Operation>
              <Heater-Equipment><System-Id>5</System-Id><Heater-Type>HTR_GAS</Heater-Type></Heater-Equipment>
              <Heater-Equipment>
                <System-Id>6</System-Id><Heater-Type>HTR_SOLAR</Heater-Type>
                <Sensor-System-Id>17</Sensor-System-Id>
              </Heater-Equipment>
            </Operation>
          </Heater>
          <CSAD><System-Id>11</System-Id><CalibrationValue>0.2</CalibrationValue></CSAD>
        </Body-of-water>
    </Backyard></MSPConfig>";

    const STATUS: &[u8] = br#"<STATUS>
        <Backyard systemId="0" state="1" airTemp="71"/>
        <BodyOfWater systemId="1" waterTemp="255" flow="1"/>
        <Filter systemId="3" filterState="2" filterSpeed="50" power="900"/>
        <ColorLogic-Light systemId="9" lightState="7" currentShow="2" brightness="2" speed="4"/>
        <VirtualHeater systemId="4" Current-Set-Point="84" enable="no"/>
        <Heater systemId="5" heaterState="0" temp="65535"/>
        <Heater systemId="6" heaterState="1" temp="91"/>
        <CSAD systemId="11" ph="7.0" orp="700"/>
    </STATUS>"#;

    fn index() -> EntityIndex {
        EntityIndex::from_payloads(
            &parse_config(CONFIG).unwrap(),
            &parse_telemetry(STATUS).unwrap(),
        )
    }

    #[test]
    fn narrowing_fails_loudly() {
        let index = index();
        let err = index.entity::<kind::Pump>(3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::WrongDeviceKind {
                system_id: 3,
                actual: OmniType::Filter,
                ..
            }
        ));
        assert!(matches!(
            index.entity::<kind::Filter>(9999),
            Err(CoreError::UnknownDevice { system_id: 9999 })
        ));
    }

    #[test]
    fn shared_accessors() {
        let index = index();
        let filter = index.entity::<kind::Filter>(3).unwrap();
        assert_eq!(filter.unique_id(), "1 3 Filter Pump");
        assert_eq!(filter.device_association(), 1);
        assert!(filter.available());

        let air = index.entity::<kind::Sensor>(16).unwrap();
        assert_eq!(air.unique_id(), "none 16 Air");
        assert_eq!(air.device_association(), BACKYARD_SYSTEM_ID);
    }

    #[test]
    fn filter_readings() {
        let index = index();
        let filter = index.entity::<kind::Filter>(3).unwrap();
        assert!(filter.is_on());
        assert_eq!(filter.speed_percent(), Some(50));
        assert_eq!(filter.speed_rpm(), Some(1500));
        assert_eq!(filter.preset_speed(SpeedPreset::Low), Some(40));
        assert_eq!(filter.preset_speed(SpeedPreset::High), None);
        assert_eq!(filter.power_watts(), Some(900));
    }

    #[test]
    fn light_in_cooldown_refuses_power_on() {
        let index = index();
        let light = index.entity::<kind::Light>(9).unwrap();
        assert!(!light.is_on());
        assert!(!light.accepts_power_on());
        assert_eq!(light.brightness_255(), Some(127));
        assert_eq!(light.show(), Some(ColorLogicShow::RoyalBlue));
    }

    #[test]
    fn sensors_resolve_through_sentinels() {
        let index = index();
        let reading = |id| index.entity::<kind::Sensor>(id).unwrap().reading();
        assert_eq!(reading(16), Some(71));
        assert_eq!(reading(18), None);
        assert_eq!(reading(19), Some(1));
        assert_eq!(reading(17), Some(91));
    }

    #[test]
    fn virtual_heater_readings() {
        let index = index();
        let heater = index.entity::<kind::VirtualHeater>(4).unwrap();
        assert_eq!(heater.target_temperature(), Some(84));
        assert_eq!(heater.current_temperature(), None);
        assert!(!heater.is_enabled());
        assert_eq!((heater.min_temp(), heater.max_temp()), (65, 104));

        let equipment: Vec<SystemId> = heater.equipment().iter().map(|e| e.system_id()).collect();
        assert_eq!(equipment, vec![5, 6]);
        assert_eq!(
            index.entity::<kind::HeaterEquipment>(5).unwrap().temperature(),
            None
        );
    }

    #[test]
    fn heater_equipment_reports_heating() {
        let index = index();
        assert!(!index.entity::<kind::HeaterEquipment>(5).unwrap().is_heating());
        assert!(index.entity::<kind::HeaterEquipment>(6).unwrap().is_heating());
    }

    #[test]
    fn filter_remembers_last_speed() {
        let index = index();
        assert_eq!(index.entity::<kind::Filter>(3).unwrap().last_speed(), None);

        let status = br#"<STATUS>
            <Backyard systemId="0" state="1"/>
            <Filter systemId="3" filterState="0" lastSpeed="65"/>
        </STATUS>"#;
        let index = EntityIndex::from_payloads(
            &parse_config(CONFIG).unwrap(),
            &parse_telemetry(status).unwrap(),
        );
        assert_eq!(index.entity::<kind::Filter>(3).unwrap().last_speed(), Some(65));
    }

    #[test]
    fn out_of_range_codes_yield_no_reading() {
        let status = br#"<STATUS>
            <Backyard systemId="0" state="1"/>
            <Filter systemId="3" filterState="1" filterSpeed="9223372036854775807"/>
            <ColorLogic-Light systemId="9" lightState="6" currentShow="2" brightness="99999999999999999" speed="4"/>
        </STATUS>"#;
        let index = EntityIndex::from_payloads(
            &parse_config(CONFIG).unwrap(),
            &parse_telemetry(status).unwrap(),
        );
        assert_eq!(index.entity::<kind::Light>(9).unwrap().brightness_255(), None);
        assert_eq!(index.entity::<kind::Filter>(3).unwrap().speed_rpm(), None);
    }

    #[test]
    fn csad_ph_is_calibrated() {
        let index = index();
        let csad = index.entity::<kind::Csad>(11).unwrap();
        assert!((csad.ph().unwrap() - 7.2).abs() < 1e-9);
        assert_eq!(csad.orp(), Some(700));
    }

    #[test]
    fn unavailable_when_backyard_is_not_on() {
        let config = parse_config(CONFIG).unwrap();
        let telemetry =
            parse_telemetry(br#"<STATUS><Backyard systemId="0" state="2"/></STATUS>"#).unwrap();
        let index = EntityIndex::from_payloads(&config, &telemetry);
        let filter = index.entity::<kind::Filter>(3).unwrap();
        assert!(!filter.available());
        assert!(!filter.is_on());
        assert_eq!(filter.power_watts(), None);

        let backyard = index.entity::<kind::Backyard>(0).unwrap();
        assert!(!backyard.available());
        assert!(backyard.in_service_mode());
    }

    #[test]
    fn backyard_on_is_not_service_mode() {
        let index = index();
        let backyard = index.entity::<kind::Backyard>(0).unwrap();
        assert!(backyard.available());
        assert!(!backyard.in_service_mode());
    }
}
