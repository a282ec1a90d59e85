// ── Sentinel readings ──
//
// The controller reports "no reading" with reserved raw values. Which
// values are reserved depends on the field, so every reader resolves
// through this table instead of comparing literals.

use serde::Serialize;

/// A telemetry field that can carry a sentinel instead of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SentinelField {
    /// Backyard `airTemp`.
    AirTemp,
    /// Body-of-water `waterTemp`.
    WaterTemp,
    /// Heater equipment `temp`.
    HeaterTemp,
    /// Body-of-water `flow`.
    Flow,
}

const TEMPERATURE: &[i64] = &[-1, 255, 65535];

const TABLE: &[(SentinelField, &[i64])] = &[
    (SentinelField::AirTemp, TEMPERATURE),
    (SentinelField::WaterTemp, TEMPERATURE),
    (SentinelField::HeaterTemp, TEMPERATURE),
    (SentinelField::Flow, &[]),
];

/// Reserved raw values for `field`.
pub fn sentinels(field: SentinelField) -> &'static [i64] {
    TABLE
        .iter()
        .find(|(f, _)| *f == field)
        .map_or(&[], |(_, values)| values)
}

/// Interpret a raw value, mapping sentinels (and absence) to `None`.
pub fn reading(field: SentinelField, raw: Option<i64>) -> Option<i64> {
    raw.filter(|value| !sentinels(field).contains(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn temperature_sentinels_mean_no_reading() {
        for raw in [-1, 255, 65535] {
            assert_eq!(reading(SentinelField::WaterTemp, Some(raw)), None);
            assert_eq!(reading(SentinelField::AirTemp, Some(raw)), None);
            assert_eq!(reading(SentinelField::HeaterTemp, Some(raw)), None);
        }
        assert_eq!(reading(SentinelField::WaterTemp, Some(82)), Some(82));
        assert_eq!(reading(SentinelField::WaterTemp, None), None);
    }

    #[test]
    fn flow_is_reported_raw() {
        assert!(sentinels(SentinelField::Flow).is_empty());
        assert_eq!(reading(SentinelField::Flow, Some(255)), Some(255));
    }
}
