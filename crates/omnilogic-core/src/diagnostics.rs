// ── Diagnostics dump ──
//
// Everything needed to reproduce an index offline: the raw payloads of
// the last successful cycle, the index built from them, and the
// update status at capture time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coordinator::UpdateStatus;
use crate::store::DataStore;

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub captured_at: DateTime<Utc>,
    pub status: UpdateStatus,
    pub fetched_at: Option<DateTime<Utc>>,
    pub configuration_payload: Option<String>,
    pub telemetry_payload: Option<String>,
    pub entries: usize,
    pub index: serde_json::Value,
}

impl Diagnostics {
    pub(crate) fn capture(store: &DataStore, status: &UpdateStatus) -> Self {
        let payloads = store.payloads();
        let index = store.index();
        let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();

        Self {
            captured_at: Utc::now(),
            status: status.clone(),
            fetched_at: payloads.as_ref().map(|p| p.fetched_at),
            configuration_payload: payloads.as_ref().map(|p| text(&p.configuration)),
            telemetry_payload: payloads.as_ref().map(|p| text(&p.telemetry)),
            entries: index.len(),
            index: serde_json::to_value(&*index).unwrap_or_else(|e| {
                serde_json::Value::String(format!("index could not be serialized: {e}"))
            }),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
