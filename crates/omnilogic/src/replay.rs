//! Offline stand-in for the controller: serves captured payload files.
//!
//! Both files are re-read on every fetch, so editing them while `watch`
//! runs shows up on the next cycle.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info};

use omnilogic_core::{ApiError, CommandRequest, OmniApi, SystemId};

use crate::cli::PayloadArgs;

pub struct ReplayApi {
    config: PathBuf,
    telemetry: PathBuf,
}

impl ReplayApi {
    pub fn new(payloads: &PayloadArgs) -> Self {
        Self {
            config: payloads.config.clone(),
            telemetry: payloads.telemetry.clone(),
        }
    }
}

async fn read_payload(path: &Path) -> Result<Bytes, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Connection(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), len = bytes.len(), "replayed payload");
    Ok(Bytes::from(bytes))
}

impl OmniApi for ReplayApi {
    async fn fetch_configuration(&self) -> Result<Bytes, ApiError> {
        read_payload(&self.config).await
    }

    async fn fetch_telemetry(&self) -> Result<Bytes, ApiError> {
        read_payload(&self.telemetry).await
    }

    async fn send_command(
        &self,
        bow_id: Option<SystemId>,
        system_id: SystemId,
        request: CommandRequest,
    ) -> Result<(), ApiError> {
        info!(?bow_id, system_id, ?request, "replay accepted command");
        Ok(())
    }
}
