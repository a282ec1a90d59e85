//! Offline index handlers: `index`, `show` and `walk`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Value, json};
use tabled::Tabled;

use omnilogic_core::model::sentinel::{self, SentinelField};
use omnilogic_core::{
    CoreError, DeviceConfig, DeviceKind, EntityIndex, EntityIndexEntry, IndexedEntity, OmniType,
    kind, parse_config, walk,
};

use crate::cli::{GlobalOpts, IndexArgs, ShowArgs, WalkArgs};
use crate::error::CliError;
use crate::output::Printer;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "BoW")]
    bow: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&EntityIndexEntry> for EntryRow {
    fn from(e: &EntityIndexEntry) -> Self {
        Self {
            id: e.system_id().to_string(),
            name: e.msp_config.name.clone(),
            kind: e.omni_type().to_string(),
            bow: util::bow_label(e),
            state: util::state_summary(e),
        }
    }
}

/// One device in walk order.
#[derive(Serialize)]
struct WalkStep {
    position: usize,
    #[serde(flatten)]
    device: DeviceConfig,
}

#[derive(Tabled)]
struct WalkRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "BoW")]
    bow: String,
}

impl From<&WalkStep> for WalkRow {
    fn from(s: &WalkStep) -> Self {
        Self {
            position: s.position,
            id: s.device.system_id.to_string(),
            name: s.device.name.clone(),
            kind: s.device.omni_type().to_string(),
            bow: s.device.bow_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

type Readings = BTreeMap<&'static str, Value>;

/// An entry plus everything derived from it through typed accessors.
#[derive(Serialize)]
pub struct DeviceView<'a> {
    #[serde(flatten)]
    pub entry: &'a EntityIndexEntry,
    pub unique_id: Option<String>,
    pub available: Option<bool>,
    pub readings: Readings,
}

impl<'a> DeviceView<'a> {
    pub fn new(index: &'a EntityIndex, entry: &'a EntityIndexEntry) -> Result<Self, CoreError> {
        let mut view = Self {
            entry,
            unique_id: None,
            available: None,
            readings: Readings::new(),
        };
        view.fill(index)?;
        Ok(view)
    }

    fn identify<K: DeviceKind>(&mut self, entity: &IndexedEntity<'_, K>) {
        self.unique_id = Some(entity.unique_id());
        self.available = Some(entity.available());
    }

    fn put(&mut self, key: &'static str, value: Value) {
        self.readings.insert(key, value);
    }

    #[allow(clippy::too_many_lines)]
    fn fill(&mut self, index: &'a EntityIndex) -> Result<(), CoreError> {
        let id = self.entry.system_id();
        match self.entry.omni_type() {
            OmniType::Backyard => {
                let e = index.entity::<kind::Backyard>(id)?;
                self.identify(&e);
                let t = e.telemetry();
                self.put("state", json!(t.map(|t| t.state.to_string())));
                self.put(
                    "air_temp",
                    json!(sentinel::reading(SentinelField::AirTemp, t.and_then(|t| t.air_temp))),
                );
                self.put("service_mode", json!(e.in_service_mode()));
            }
            OmniType::BodyOfWater => {
                let e = index.entity::<kind::BodyOfWater>(id)?;
                self.identify(&e);
                let t = e.telemetry();
                self.put(
                    "water_temp",
                    json!(sentinel::reading(SentinelField::WaterTemp, t.and_then(|t| t.water_temp))),
                );
                self.put("flow", json!(t.and_then(|t| t.flow)));
            }
            OmniType::Filter => {
                let e = index.entity::<kind::Filter>(id)?;
                self.identify(&e);
                self.put("on", json!(e.is_on()));
                self.put("speed_percent", json!(e.speed_percent()));
                self.put("speed_rpm", json!(e.speed_rpm()));
                self.put("last_speed", json!(e.last_speed()));
                self.put("power_watts", json!(e.power_watts()));
            }
            OmniType::Pump => {
                let e = index.entity::<kind::Pump>(id)?;
                self.identify(&e);
                self.put("on", json!(e.is_on()));
                self.put("speed_percent", json!(e.speed_percent()));
                self.put("speed_rpm", json!(e.speed_rpm()));
                self.put("last_speed", json!(e.last_speed()));
            }
            OmniType::Relay => {
                let e = index.entity::<kind::Relay>(id)?;
                self.identify(&e);
                self.put("on", json!(e.is_on()));
            }
            OmniType::ValveActuator => {
                let e = index.entity::<kind::ValveActuator>(id)?;
                self.identify(&e);
                self.put("on", json!(e.is_on()));
            }
            OmniType::ColorLogicLight => {
                let e = index.entity::<kind::Light>(id)?;
                self.identify(&e);
                self.put("on", json!(e.is_on()));
                self.put("brightness", json!(e.brightness_255()));
                self.put("show", json!(e.show().map(|s| s.to_string())));
            }
            OmniType::Sensor => {
                let e = index.entity::<kind::Sensor>(id)?;
                self.identify(&e);
                self.put("reading", json!(e.reading()));
            }
            OmniType::VirtualHeater => {
                let e = index.entity::<kind::VirtualHeater>(id)?;
                self.identify(&e);
                self.put("enabled", json!(e.is_enabled()));
                self.put("target_temperature", json!(e.target_temperature()));
                self.put("current_temperature", json!(e.current_temperature()));
                self.put("min_temp", json!(e.min_temp()));
                self.put("max_temp", json!(e.max_temp()));
                let equipment: Vec<_> = e.equipment().iter().map(|eq| eq.system_id()).collect();
                self.put("equipment", json!(equipment));
            }
            OmniType::HeaterEquipment => {
                let e = index.entity::<kind::HeaterEquipment>(id)?;
                self.identify(&e);
                self.put("temperature", json!(e.temperature()));
                self.put("heating", json!(e.is_heating()));
            }
            OmniType::Chlorinator => {
                let e = index.entity::<kind::Chlorinator>(id)?;
                self.identify(&e);
                self.put("average_salt_level", json!(e.average_salt_level()));
                self.put("instant_salt_level", json!(e.instant_salt_level()));
            }
            OmniType::Csad => {
                let e = index.entity::<kind::Csad>(id)?;
                self.identify(&e);
                self.put("ph", json!(e.ph()));
                self.put("orp", json!(e.orp()));
            }
            OmniType::ChlorinatorEquipment | OmniType::Group => {}
        }
        Ok(())
    }
}

fn detail(view: &DeviceView<'_>) -> String {
    let entry = view.entry;
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {}", "ID:", entry.system_id());
    let _ = writeln!(out, "{:<20} {}", "Name:", entry.msp_config.name);
    let _ = writeln!(out, "{:<20} {}", "Type:", entry.omni_type());
    let _ = writeln!(out, "{:<20} {}", "Body of water:", util::bow_label(entry));
    if let Some(ref unique_id) = view.unique_id {
        let _ = writeln!(out, "{:<20} {unique_id}", "Unique ID:");
    }
    if let Some(available) = view.available {
        let _ = writeln!(out, "{:<20} {}", "Available:", if available { "yes" } else { "no" });
    }
    let _ = writeln!(out, "{:<20} {}", "State:", util::state_summary(entry));
    for (key, value) in &view.readings {
        let shown = match value {
            Value::Null => "-".to_owned(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let _ = writeln!(out, "{:<20} {shown}", format!("{key}:"));
    }
    out.trim_end().to_owned()
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn handle_index(args: &IndexArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let index = util::load_index(&args.payloads)?;

    let entries: Vec<&EntityIndexEntry> = match (args.kind, args.platform) {
        (Some(kind), _) => index.of_omni_types(&[kind]),
        (None, Some(platform)) => index.of_platform(platform),
        (None, None) => index.iter().collect(),
    };

    Printer::new(global).list(
        &entries,
        |e| EntryRow::from(*e),
        |e| e.system_id().to_string(),
    )
}

pub fn handle_show(args: &ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let index = util::load_index(&args.payloads)?;
    let entry = index.get(args.system_id).ok_or(CoreError::UnknownDevice {
        system_id: args.system_id,
    })?;
    let view = DeviceView::new(&index, entry)?;

    Printer::new(global).single(&view, detail, |v| v.entry.system_id().to_string())
}

pub fn handle_walk(args: &WalkArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = parse_config(&util::read_payload(&args.config)?)?;
    let steps: Vec<WalkStep> = walk(&config)
        .enumerate()
        .map(|(i, device)| WalkStep {
            position: i + 1,
            device,
        })
        .collect();

    Printer::new(global).list(
        &steps,
        |s| WalkRow::from(s),
        |s| s.device.system_id.to_string(),
    )
}
