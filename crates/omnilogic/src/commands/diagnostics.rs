//! `diagnostics` handler.

use tracing::warn;

use crate::cli::{GlobalOpts, PayloadArgs};
use crate::error::CliError;
use crate::output::Printer;

use super::util;

/// Run one cycle and dump what the coordinator saw. A failed cycle is
/// still dumped; its error shows up in the update status.
pub async fn handle(args: &PayloadArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = util::replay_coordinator(args, global)?;
    if let Err(e) = coordinator.start().await {
        warn!(error = %e, "first refresh failed");
    }
    let diagnostics = coordinator.diagnostics();
    coordinator.shutdown().await;

    Printer::document(global).single(&diagnostics, |_| String::new(), |d| {
        d.entries.to_string()
    })
}
