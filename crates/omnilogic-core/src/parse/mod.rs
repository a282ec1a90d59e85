// ── Payload parsers ──
//
// Raw bytes → normalized tree → typed records. Any failure along the
// way is a `CoreError::Parse`.

pub(crate) mod de;
mod mspconfig;
mod telemetry;
pub(crate) mod xml;

pub use mspconfig::parse_config;
pub use telemetry::parse_telemetry;
