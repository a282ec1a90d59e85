// omnilogic-core: Configuration/telemetry correlation engine for OmniLogic controllers.

pub mod api;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod index;
pub mod model;
pub mod mutation;
pub mod parse;
pub mod store;
pub mod stream;
pub mod walker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{CommandRequest, EquipmentValue, OmniApi, TemperatureUnit};
pub use command::{Command, CommandResult};
pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, PollState, UpdateStatus};
pub use diagnostics::Diagnostics;
pub use entity::{DeviceKind, IndexedEntity, SpeedPreset, kind};
pub use error::{ApiError, CoreError, PayloadKind};
pub use index::{EntityIndex, EntityIndexEntry};
pub use mutation::{ConfigField, FieldUpdate, Mutation, TelemetryField};
pub use parse::{parse_config, parse_telemetry};
pub use store::{DataStore, ListenerId};
pub use stream::IndexStream;
pub use walker::{DeviceWalker, walk};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity
    BACKYARD_SYSTEM_ID, OmniType, Platform, SystemId,
    // Configuration
    ConfigNode, ConfigPayload, DeviceConfig, MspConfig, SystemConfig,
    // Telemetry
    DeviceTelemetry, Telemetry,
};
