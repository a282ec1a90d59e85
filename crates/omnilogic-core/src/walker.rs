// ── Device walker ──
//
// Flattens the configuration tree into every addressable device record,
// depth-first, each container before its children. Yielded records are
// shallow: `DeviceConfig` never holds its sub-device lists.

use crate::model::{ConfigNode, DeviceConfig, MspConfig};

/// Lazy depth-first iterator over a configuration tree.
///
/// Consumed as it goes; walk the tree again for a second pass.
pub struct DeviceWalker<'a> {
    stack: Vec<&'a ConfigNode>,
}

impl<'a> DeviceWalker<'a> {
    pub fn new(root: &'a ConfigNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl Iterator for DeviceWalker<'_> {
    type Item = DeviceConfig;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node.device.clone())
    }
}

/// Walk every device in a parsed configuration, backyard first.
pub fn walk(config: &MspConfig) -> DeviceWalker<'_> {
    DeviceWalker::new(&config.backyard)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{OmniType, SystemId};
    use crate::parse::parse_config;

    const CONFIG: &[u8] = br"<MSPConfig><Backyard>
        <System-Id>0</System-Id>
        <Sensor><System-Id>16</System-Id><Type>SENSOR_AIR_TEMP</Type></Sensor>
        <Body-of-water>
          <System-Id>1</System-Id><Name>Pool</Name>
          <Filter><System-Id>3</System-Id></Filter>
          <Heater>
            <System-Id>4</System-Id>
            <Operation>
              <Heater-Equipment><System-Id>5</System-Id><Heater-Type>HTR_GAS</Heater-Type></Heater-Equipment>
              <Heater-Equipment><System-Id>6</System-Id><Heater-Type>HTR_SOLAR</Heater-Type></Heater-Equipment>
            </Operation>
          </Heater>
        </Body-of-water>
        <Body-of-water>
          <System-Id>10</System-Id><Name>Spa</Name>
          <Filter><System-Id>11</System-Id></Filter>
        </Body-of-water>
    </Backyard></MSPConfig>";

    #[test]
    fn walks_depth_first_with_containers_first() {
        let config = parse_config(CONFIG).unwrap();
        let ids: Vec<SystemId> = walk(&config).map(|d| d.system_id).collect();
        assert_eq!(ids, vec![0, 16, 1, 3, 4, 5, 6, 10, 11]);
    }

    #[test]
    fn heater_equipment_is_yielded_separately() {
        let config = parse_config(CONFIG).unwrap();
        let kinds: Vec<(SystemId, OmniType)> = walk(&config)
            .filter(|d| {
                matches!(
                    d.omni_type(),
                    OmniType::VirtualHeater | OmniType::HeaterEquipment
                )
            })
            .map(|d| (d.system_id, d.omni_type()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (4, OmniType::VirtualHeater),
                (5, OmniType::HeaterEquipment),
                (6, OmniType::HeaterEquipment),
            ]
        );
    }

    #[test]
    fn ids_are_unique_and_bow_ids_follow_nesting() {
        let config = parse_config(CONFIG).unwrap();
        let devices: Vec<DeviceConfig> = walk(&config).collect();

        let mut ids: Vec<SystemId> = devices.iter().map(|d| d.system_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), devices.len());

        let bow_of = |id: SystemId| devices.iter().find(|d| d.system_id == id).unwrap().bow_id;
        assert_eq!(bow_of(16), None);
        assert_eq!(bow_of(1), None);
        assert_eq!(bow_of(5), Some(1));
        assert_eq!(bow_of(11), Some(10));
    }

    #[test]
    fn walker_is_exhausted_after_one_pass() {
        let config = parse_config(CONFIG).unwrap();
        let mut walker = walk(&config);
        assert_eq!(walker.by_ref().count(), 9);
        assert!(walker.next().is_none());
    }
}
