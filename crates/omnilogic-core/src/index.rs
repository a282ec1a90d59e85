// ── Entity index ──
//
// Joins walked configuration records with their telemetry by system id.
// Built whole on every successful poll; patched in place only through
// `apply_mutation`.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{
    BACKYARD_SYSTEM_ID, ConfigPayload, DeviceConfig, DeviceTelemetry, HeaterType, MspConfig,
    OmniType, Platform, SystemConfig, SystemId, Telemetry,
};
use crate::mutation::Mutation;
use crate::walker;

/// One configured device and its live state, if the controller reported any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityIndexEntry {
    pub msp_config: DeviceConfig,
    pub telemetry: Option<DeviceTelemetry>,
}

impl EntityIndexEntry {
    pub fn system_id(&self) -> SystemId {
        self.msp_config.system_id
    }

    pub fn omni_type(&self) -> OmniType {
        self.msp_config.omni_type()
    }
}

/// System id → entry, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityIndex {
    system: SystemConfig,
    entries: IndexMap<SystemId, EntityIndexEntry>,
}

impl EntityIndex {
    /// Join a flattened device sequence with a telemetry snapshot.
    ///
    /// Devices without telemetry get `telemetry: None`. When two devices
    /// claim the same id the later one replaces the earlier.
    pub fn build(
        system: SystemConfig,
        devices: impl IntoIterator<Item = DeviceConfig>,
        telemetry: &Telemetry,
    ) -> Self {
        let mut entries: IndexMap<SystemId, EntityIndexEntry> = IndexMap::new();
        for device in devices {
            let system_id = device.system_id;
            let entry = EntityIndexEntry {
                telemetry: telemetry.get(system_id),
                msp_config: device,
            };
            if let Some(previous) = entries.insert(system_id, entry) {
                warn!(
                    system_id,
                    replaced = %previous.omni_type(),
                    "duplicate system id in configuration, keeping the later record"
                );
            }
        }
        Self { system, entries }
    }

    /// Walk `config` and join it with `telemetry`.
    pub fn from_payloads(config: &MspConfig, telemetry: &Telemetry) -> Self {
        Self::build(config.system.clone(), walker::walk(config), telemetry)
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn get(&self, system_id: SystemId) -> Option<&EntityIndexEntry> {
        self.entries.get(&system_id)
    }

    pub fn contains(&self, system_id: SystemId) -> bool {
        self.entries.contains_key(&system_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityIndexEntry> {
        self.entries.values()
    }

    /// Controller-wide `<System>` settings from the configuration payload.
    pub fn system(&self) -> &SystemConfig {
        &self.system
    }

    pub fn backyard(&self) -> Option<&EntityIndexEntry> {
        self.get(BACKYARD_SYSTEM_ID)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn of_omni_types(&self, types: &[OmniType]) -> Vec<&EntityIndexEntry> {
        self.iter()
            .filter(|entry| types.contains(&entry.omni_type()))
            .collect()
    }

    pub fn of_platform(&self, platform: Platform) -> Vec<&EntityIndexEntry> {
        self.iter()
            .filter(|entry| entry.omni_type().platform() == Some(platform))
            .collect()
    }

    /// Physical heater elements driven by the virtual heater `heater_id`.
    pub fn heater_equipment_of(&self, heater_id: SystemId) -> Vec<&EntityIndexEntry> {
        self.iter()
            .filter(|entry| match &entry.msp_config.payload {
                ConfigPayload::HeaterEquipment(equipment) => equipment.heater_id == Some(heater_id),
                _ => false,
            })
            .collect()
    }

    /// The solar heater element whose temperature sensor is `sensor_id`.
    pub fn solar_heater_for_sensor(&self, sensor_id: SystemId) -> Option<&EntityIndexEntry> {
        self.iter().find(|entry| match &entry.msp_config.payload {
            ConfigPayload::HeaterEquipment(equipment) => {
                equipment.heater_type == HeaterType::Solar
                    && equipment.sensor_system_id == Some(sensor_id)
            }
            _ => false,
        })
    }

    // ── Optimistic updates ───────────────────────────────────────────

    /// The entry `system_id` would become after `mutation`, without
    /// touching the index.
    pub fn preview_mutation(
        &self,
        system_id: SystemId,
        mutation: &Mutation,
    ) -> Result<EntityIndexEntry, CoreError> {
        let entry = self
            .get(system_id)
            .ok_or(CoreError::UnknownDevice { system_id })?;
        let mut updated = entry.clone();
        mutation.apply_to(&mut updated)?;
        Ok(updated)
    }

    /// Write `mutation` into the entry for `system_id`.
    ///
    /// Every field is checked before any is written, so a failure leaves
    /// the entry exactly as it was.
    pub fn apply_mutation(
        &mut self,
        system_id: SystemId,
        mutation: &Mutation,
    ) -> Result<(), CoreError> {
        let updated = self.preview_mutation(system_id, mutation)?;
        if let Some(slot) = self.entries.get_mut(&system_id) {
            *slot = updated;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EntityIndex {
    type Item = &'a EntityIndexEntry;
    type IntoIter = indexmap::map::Values<'a, SystemId, EntityIndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
