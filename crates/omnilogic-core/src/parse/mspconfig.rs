// ── Configuration parser ──
//
// `<MSPConfig>` → `MspConfig`. The raw structs mirror the document
// layout; conversion assigns body-of-water ownership and drops any
// record the controller sent without a system id.

use serde::Deserialize;
use tracing::debug;

use super::{de, xml};
use crate::error::{CoreError, PayloadKind};
use crate::model::{
    BACKYARD_SYSTEM_ID, BackyardConfig, BodyOfWaterConfig, ChlorinatorConfig,
    ChlorinatorEquipmentConfig, ConfigNode, ConfigPayload, CsadConfig, DeviceConfig, FilterConfig,
    HeaterEquipmentConfig, LightConfig, MspConfig, PumpConfig, RelayConfig, SensorConfig,
    SystemConfig, SystemId, VirtualHeaterConfig,
};

const ROOT: &str = "MSPConfig";

// ── Raw document layout ──────────────────────────────────────────────

#[derive(Deserialize)]
struct RawMspConfig {
    #[serde(rename = "System", default)]
    system: SystemConfig,
    #[serde(rename = "Backyard")]
    backyard: Option<RawBackyard>,
    #[serde(rename = "CHECKSUM", default, deserialize_with = "de::opt_text")]
    checksum: Option<String>,
}

#[derive(Deserialize)]
struct RawDevice<P> {
    #[serde(rename = "System_Id", default)]
    system_id: Option<SystemId>,
    #[serde(rename = "Name", default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(flatten)]
    payload: P,
}

#[derive(Deserialize)]
struct RawBackyard {
    #[serde(rename = "System_Id", default)]
    system_id: Option<SystemId>,
    #[serde(rename = "Name", default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(rename = "Sensor", default, deserialize_with = "de::one_or_many")]
    sensors: Vec<RawDevice<SensorConfig>>,
    #[serde(rename = "Relay", default, deserialize_with = "de::one_or_many")]
    relays: Vec<RawDevice<RelayConfig>>,
    #[serde(rename = "ColorLogic_Light", default, deserialize_with = "de::one_or_many")]
    lights: Vec<RawDevice<LightConfig>>,
    #[serde(rename = "Pump", default, deserialize_with = "de::one_or_many")]
    pumps: Vec<RawDevice<PumpConfig>>,
    #[serde(rename = "Body_of_water", default, deserialize_with = "de::one_or_many")]
    bodies_of_water: Vec<RawBodyOfWater>,
}

#[derive(Deserialize)]
struct RawBodyOfWater {
    #[serde(rename = "System_Id", default)]
    system_id: Option<SystemId>,
    #[serde(rename = "Name", default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(flatten)]
    payload: BodyOfWaterConfig,
    #[serde(rename = "Filter", default, deserialize_with = "de::one_or_many")]
    filters: Vec<RawDevice<FilterConfig>>,
    #[serde(rename = "Pump", default, deserialize_with = "de::one_or_many")]
    pumps: Vec<RawDevice<PumpConfig>>,
    #[serde(rename = "Relay", default, deserialize_with = "de::one_or_many")]
    relays: Vec<RawDevice<RelayConfig>>,
    #[serde(rename = "ColorLogic_Light", default, deserialize_with = "de::one_or_many")]
    lights: Vec<RawDevice<LightConfig>>,
    #[serde(rename = "Sensor", default, deserialize_with = "de::one_or_many")]
    sensors: Vec<RawDevice<SensorConfig>>,
    #[serde(rename = "Heater", default, deserialize_with = "de::one_or_many")]
    heaters: Vec<RawHeater>,
    #[serde(rename = "Chlorinator", default, deserialize_with = "de::one_or_many")]
    chlorinators: Vec<RawChlorinator>,
    #[serde(rename = "CSAD", default, deserialize_with = "de::one_or_many")]
    csads: Vec<RawDevice<CsadConfig>>,
}

#[derive(Deserialize)]
struct RawHeater {
    #[serde(rename = "System_Id", default)]
    system_id: Option<SystemId>,
    #[serde(rename = "Name", default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(flatten)]
    payload: VirtualHeaterConfig,
    #[serde(rename = "Operation", default, deserialize_with = "de::one_or_many")]
    operations: Vec<RawHeaterOperation>,
}

#[derive(Deserialize)]
struct RawHeaterOperation {
    #[serde(rename = "Heater_Equipment", default, deserialize_with = "de::one_or_many")]
    equipment: Vec<RawDevice<HeaterEquipmentConfig>>,
}

#[derive(Deserialize)]
struct RawChlorinator {
    #[serde(rename = "System_Id", default)]
    system_id: Option<SystemId>,
    #[serde(rename = "Name", default, deserialize_with = "de::opt_text")]
    name: Option<String>,
    #[serde(flatten)]
    payload: ChlorinatorConfig,
    #[serde(rename = "Operation", default, deserialize_with = "de::one_or_many")]
    operations: Vec<RawChlorinatorOperation>,
}

#[derive(Deserialize)]
struct RawChlorinatorOperation {
    #[serde(rename = "Chlorinator_Equipment", default, deserialize_with = "de::one_or_many")]
    equipment: Vec<RawDevice<ChlorinatorEquipmentConfig>>,
}

// ── Entry point ──────────────────────────────────────────────────────

/// Decode a raw `<MSPConfig>` payload into a typed device tree.
pub fn parse_config(payload: &[u8]) -> Result<MspConfig, CoreError> {
    let fail = |message: String| CoreError::parse(PayloadKind::Configuration, message);

    let doc = xml::normalize(payload).map_err(fail)?;
    if doc.root != ROOT {
        return Err(fail(format!("expected <{ROOT}> root, found <{}>", doc.root)));
    }

    let raw: RawMspConfig = serde_json::from_value(doc.body).map_err(|e| fail(e.to_string()))?;
    let backyard = raw
        .backyard
        .ok_or_else(|| fail("missing <Backyard> element".into()))?;

    Ok(MspConfig {
        system: raw.system,
        backyard: convert_backyard(backyard),
        checksum: raw.checksum,
    })
}

// ── Conversion ───────────────────────────────────────────────────────

fn device(
    system_id: Option<SystemId>,
    name: Option<String>,
    bow_id: Option<SystemId>,
    payload: ConfigPayload,
) -> Option<DeviceConfig> {
    let Some(system_id) = system_id else {
        debug!(omni_type = %payload.omni_type(), "skipping device record without a system id");
        return None;
    };
    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| payload.omni_type().to_string());
    Some(DeviceConfig {
        system_id,
        name,
        bow_id,
        payload,
    })
}

fn leaves<P>(
    raws: Vec<RawDevice<P>>,
    bow_id: Option<SystemId>,
    wrap: fn(P) -> ConfigPayload,
) -> impl Iterator<Item = ConfigNode> {
    raws.into_iter().filter_map(move |raw| {
        device(raw.system_id, raw.name, bow_id, wrap(raw.payload)).map(ConfigNode::leaf)
    })
}

/// A container keeps its children beneath it; one without an id hands
/// them up to its own parent so they stay addressable.
fn container(device: Option<DeviceConfig>, children: Vec<ConfigNode>) -> Vec<ConfigNode> {
    match device {
        Some(device) => vec![ConfigNode { device, children }],
        None => children,
    }
}

fn convert_backyard(raw: RawBackyard) -> ConfigNode {
    let mut children: Vec<ConfigNode> = Vec::new();
    children.extend(leaves(raw.sensors, None, ConfigPayload::Sensor));
    children.extend(leaves(raw.relays, None, ConfigPayload::Relay));
    children.extend(leaves(raw.lights, None, ConfigPayload::ColorLogicLight));
    children.extend(leaves(raw.pumps, None, ConfigPayload::Pump));
    for bow in raw.bodies_of_water {
        children.extend(convert_body_of_water(bow));
    }

    let system_id = raw.system_id.unwrap_or(BACKYARD_SYSTEM_ID);
    let payload = ConfigPayload::Backyard(BackyardConfig::default());
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| payload.omni_type().to_string());

    ConfigNode {
        device: DeviceConfig {
            system_id,
            name,
            bow_id: None,
            payload,
        },
        children,
    }
}

fn convert_body_of_water(raw: RawBodyOfWater) -> Vec<ConfigNode> {
    let bow = device(
        raw.system_id,
        raw.name,
        None,
        ConfigPayload::BodyOfWater(raw.payload),
    );
    let bow_id = bow.as_ref().map(|d| d.system_id);

    let mut children: Vec<ConfigNode> = Vec::new();
    children.extend(leaves(raw.filters, bow_id, ConfigPayload::Filter));
    children.extend(leaves(raw.pumps, bow_id, ConfigPayload::Pump));
    children.extend(leaves(raw.relays, bow_id, ConfigPayload::Relay));
    children.extend(leaves(raw.lights, bow_id, ConfigPayload::ColorLogicLight));
    children.extend(leaves(raw.sensors, bow_id, ConfigPayload::Sensor));
    for heater in raw.heaters {
        children.extend(convert_heater(heater, bow_id));
    }
    for chlorinator in raw.chlorinators {
        children.extend(convert_chlorinator(chlorinator, bow_id));
    }
    children.extend(leaves(raw.csads, bow_id, ConfigPayload::Csad));

    container(bow, children)
}

fn convert_heater(raw: RawHeater, bow_id: Option<SystemId>) -> Vec<ConfigNode> {
    let heater = device(
        raw.system_id,
        raw.name,
        bow_id,
        ConfigPayload::VirtualHeater(raw.payload),
    );
    let heater_id = heater.as_ref().map(|d| d.system_id);

    let children = raw
        .operations
        .into_iter()
        .flat_map(|op| op.equipment)
        .filter_map(|mut equipment| {
            equipment.payload.heater_id = heater_id;
            device(
                equipment.system_id,
                equipment.name,
                bow_id,
                ConfigPayload::HeaterEquipment(equipment.payload),
            )
        })
        .map(ConfigNode::leaf)
        .collect();

    container(heater, children)
}

fn convert_chlorinator(raw: RawChlorinator, bow_id: Option<SystemId>) -> Vec<ConfigNode> {
    let chlorinator = device(
        raw.system_id,
        raw.name,
        bow_id,
        ConfigPayload::Chlorinator(raw.payload),
    );
    let chlorinator_id = chlorinator.as_ref().map(|d| d.system_id);

    let children = raw
        .operations
        .into_iter()
        .flat_map(|op| op.equipment)
        .filter_map(|mut equipment| {
            equipment.payload.chlorinator_id = chlorinator_id;
            device(
                equipment.system_id,
                equipment.name,
                bow_id,
                ConfigPayload::ChlorinatorEquipment(equipment.payload),
            )
        })
        .map(ConfigNode::leaf)
        .collect();

    container(chlorinator, children)
}
