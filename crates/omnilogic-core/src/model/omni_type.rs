use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

/// Discriminant of every addressable device kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum OmniType {
    #[strum(to_string = "Backyard", serialize = "backyard")]
    Backyard,
    #[strum(to_string = "Body of Water", serialize = "bow", serialize = "body-of-water")]
    BodyOfWater,
    #[strum(to_string = "Filter", serialize = "filter")]
    Filter,
    #[strum(to_string = "Pump", serialize = "pump")]
    Pump,
    #[strum(to_string = "Relay", serialize = "relay")]
    Relay,
    #[strum(to_string = "Valve Actuator", serialize = "valve-actuator", serialize = "valve")]
    ValveActuator,
    #[strum(to_string = "ColorLogic Light", serialize = "light", serialize = "colorlogic-light")]
    ColorLogicLight,
    #[strum(to_string = "Sensor", serialize = "sensor")]
    Sensor,
    #[strum(to_string = "Heater", serialize = "virtual-heater", serialize = "heater")]
    VirtualHeater,
    #[strum(to_string = "Heater Equipment", serialize = "heater-equipment")]
    HeaterEquipment,
    #[strum(to_string = "Chlorinator", serialize = "chlorinator")]
    Chlorinator,
    #[strum(to_string = "Chlorinator Equipment", serialize = "chlorinator-equipment")]
    ChlorinatorEquipment,
    #[strum(to_string = "CSAD", serialize = "csad")]
    Csad,
    #[strum(to_string = "Group", serialize = "group")]
    Group,
}

/// Presentation platform a device kind surfaces as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Platform {
    Device,
    Switch,
    Light,
    Sensor,
    WaterHeater,
}

impl OmniType {
    /// The platform this kind is exposed through, if any.
    pub fn platform(self) -> Option<Platform> {
        match self {
            Self::Backyard | Self::BodyOfWater => Some(Platform::Device),
            Self::Filter
            | Self::Pump
            | Self::Relay
            | Self::ValveActuator
            | Self::Chlorinator
            | Self::ChlorinatorEquipment => Some(Platform::Switch),
            Self::ColorLogicLight => Some(Platform::Light),
            Self::Sensor | Self::Csad => Some(Platform::Sensor),
            Self::VirtualHeater | Self::HeaterEquipment => Some(Platform::WaterHeater),
            Self::Group => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("filter".parse::<OmniType>().unwrap(), OmniType::Filter);
        assert_eq!("Valve".parse::<OmniType>().unwrap(), OmniType::ValveActuator);
        assert_eq!("water_heater".parse::<Platform>().unwrap(), Platform::WaterHeater);
    }

    #[test]
    fn platform_mapping() {
        assert_eq!(OmniType::Csad.platform(), Some(Platform::Sensor));
        assert_eq!(OmniType::HeaterEquipment.platform(), Some(Platform::WaterHeater));
        assert_eq!(OmniType::Group.platform(), None);
    }
}
