// ── Integer-coded live-state enums ──
//
// Telemetry reports states as small integers. Every enum keeps an
// `Unknown(code)` fallback so new firmware codes decode instead of
// failing the whole snapshot.

use std::fmt;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "i64", into = "i64")]
        pub enum $name {
            $($variant,)+
            Unknown(i64),
        }

        impl $name {
            /// Every named variant, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn code(self) -> i64 {
                self.into()
            }
        }

        impl From<i64> for $name {
            fn from(code: i64) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $code,)+
                    $name::Unknown(code) => code,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($label),)+
                    Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
                }
            }
        }
    };
}

coded_enum! {
    /// Overall controller state reported on the backyard record.
    BackyardState {
        Off = 0 => "OFF",
        On = 1 => "ON",
        ServiceMode = 2 => "SERVICE_MODE",
        ConfigMode = 3 => "CONFIG_MODE",
        TimedServiceMode = 4 => "TIMED_SERVICE_MODE",
    }
}

coded_enum! {
    FilterState {
        Off = 0 => "OFF",
        On = 1 => "ON",
        Priming = 2 => "PRIMING",
        WaitingTurnOff = 3 => "WAITING_TURN_OFF",
        WaitingTurnOffManual = 4 => "WAITING_TURN_OFF_MANUAL",
        HeaterExtend = 5 => "HEATER_EXTEND",
        Cooldown = 6 => "COOLDOWN",
        Suspend = 7 => "SUSPEND",
        CsadExtend = 8 => "CSAD_EXTEND",
        FilterSuperchlorinate = 9 => "FILTER_SUPERCHLORINATE",
        FilterForcePriming = 10 => "FILTER_FORCE_PRIMING",
        FilterWaitingTurnOff = 11 => "FILTER_WAITING_TURN_OFF",
    }
}

coded_enum! {
    PumpState {
        Off = 0 => "OFF",
        On = 1 => "ON",
    }
}

coded_enum! {
    RelayState {
        Off = 0 => "OFF",
        On = 1 => "ON",
    }
}

coded_enum! {
    ValveActuatorState {
        Off = 0 => "OFF",
        On = 1 => "ON",
    }
}

coded_enum! {
    HeaterState {
        Off = 0 => "OFF",
        On = 1 => "ON",
        Pause = 2 => "PAUSE",
    }
}

coded_enum! {
    ColorLogicPowerState {
        Off = 0 => "OFF",
        PoweringOff = 1 => "POWERING_OFF",
        ChangingShow = 3 => "CHANGING_SHOW",
        FifteenSecondsWhite = 4 => "FIFTEEN_SECONDS_WHITE",
        Active = 6 => "ACTIVE",
        Cooldown = 7 => "COOLDOWN",
    }
}

coded_enum! {
    ColorLogicShow {
        VoodooLounge = 0 => "VOODOO_LOUNGE",
        DeepBlueSea = 1 => "DEEP_BLUE_SEA",
        RoyalBlue = 2 => "ROYAL_BLUE",
        AfternoonSky = 3 => "AFTERNOON_SKY",
        AquaGreen = 4 => "AQUA_GREEN",
        Emerald = 5 => "EMERALD",
        CloudWhite = 6 => "CLOUD_WHITE",
        WarmRed = 7 => "WARM_RED",
        Flamingo = 8 => "FLAMINGO",
        VividViolet = 9 => "VIVID_VIOLET",
        Sangria = 10 => "SANGRIA",
        Twilight = 11 => "TWILIGHT",
        Tranquility = 12 => "TRANQUILITY",
        Gemstone = 13 => "GEMSTONE",
        Usa = 14 => "USA",
        MardiGras = 15 => "MARDI_GRAS",
        CoolCabaret = 16 => "COOL_CABARET",
    }
}

coded_enum! {
    /// Brightness in five steps, 0 (20%) through 4 (100%).
    ColorLogicBrightness {
        TwentyPercent = 0 => "20%",
        FortyPercent = 1 => "40%",
        SixtyPercent = 2 => "60%",
        EightyPercent = 3 => "80%",
        OneHundredPercent = 4 => "100%",
    }
}

coded_enum! {
    ColorLogicSpeed {
        OneSixteenth = 0 => "1/16x",
        OneEighth = 1 => "1/8x",
        OneQuarter = 2 => "1/4x",
        OneHalf = 3 => "1/2x",
        OneTimes = 4 => "1x",
        TwoTimes = 5 => "2x",
        FourTimes = 6 => "4x",
        EightTimes = 7 => "8x",
        SixteenTimes = 8 => "16x",
    }
}

impl ColorLogicShow {
    /// Look a show up by its display label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|show| show.to_string().eq_ignore_ascii_case(label))
    }
}

impl ColorLogicBrightness {
    /// Scale a 0-255 level down to the nearest of the five steps.
    pub fn from_level_255(level: u8) -> Self {
        let step = (i64::from(level) * 4 + 127) / 255;
        Self::from(step)
    }

    /// Scale this step up to 0-255. Codes outside the five steps have
    /// no level.
    pub fn to_level_255(self) -> Option<i64> {
        match self {
            Self::Unknown(_) => None,
            step => Some(step.code() * 255 / 4),
        }
    }
}

impl FilterState {
    /// States in which the filter pump is actually moving water.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            Self::On
                | Self::Priming
                | Self::HeaterExtend
                | Self::CsadExtend
                | Self::FilterForcePriming
                | Self::FilterSuperchlorinate
        )
    }
}

impl ColorLogicPowerState {
    /// A light in these states refuses to power back on.
    pub fn is_winding_down(self) -> bool {
        matches!(self, Self::PoweringOff | Self::Cooldown)
    }

    pub fn is_lit(self) -> bool {
        !matches!(self, Self::Off | Self::PoweringOff | Self::Cooldown)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_are_preserved() {
        let state = FilterState::from(42);
        assert_eq!(state, FilterState::Unknown(42));
        assert_eq!(state.code(), 42);
        assert_eq!(state.to_string(), "UNKNOWN(42)");
    }

    #[test]
    fn decodes_from_json_numbers() {
        let state: ColorLogicPowerState = serde_json::from_value(serde_json::json!(4)).unwrap();
        assert_eq!(state, ColorLogicPowerState::FifteenSecondsWhite);
        assert_eq!(serde_json::to_value(state).unwrap(), serde_json::json!(4));
    }

    #[test]
    fn brightness_scaling() {
        assert_eq!(ColorLogicBrightness::OneHundredPercent.to_level_255(), Some(255));
        assert_eq!(ColorLogicBrightness::SixtyPercent.to_level_255(), Some(127));
        assert_eq!(ColorLogicBrightness::TwentyPercent.to_level_255(), Some(0));
        assert_eq!(ColorLogicBrightness::from(99_999_999_999_999_999).to_level_255(), None);
        assert_eq!(
            ColorLogicBrightness::from_level_255(255),
            ColorLogicBrightness::OneHundredPercent
        );
        assert_eq!(
            ColorLogicBrightness::from_level_255(128),
            ColorLogicBrightness::SixtyPercent
        );
        assert_eq!(ColorLogicBrightness::from_level_255(0), ColorLogicBrightness::TwentyPercent);
    }

    #[test]
    fn show_lookup_by_label() {
        assert_eq!(ColorLogicShow::from_label("emerald"), Some(ColorLogicShow::Emerald));
        assert_eq!(ColorLogicShow::from_label("disco"), None);
    }

    #[test]
    fn filter_running_states() {
        assert!(FilterState::Priming.is_running());
        assert!(!FilterState::Cooldown.is_running());
        assert!(!FilterState::Off.is_running());
    }
}
