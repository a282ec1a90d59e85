//! `watch` handler: run the poll coordinator over replayed payloads.

use chrono::Local;
use owo_colors::OwoColorize;
use tracing::debug;

use omnilogic_core::{EntityIndex, UpdateStatus};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output::Printer;

use super::util;

fn update_line(index: &EntityIndex, color: bool) -> String {
    let stamp = Local::now().format("%H:%M:%S");
    let online = index
        .iter()
        .filter(|e| e.telemetry.is_some())
        .count();
    let tag = if color {
        "updated".green().to_string()
    } else {
        "updated".to_owned()
    };
    format!(
        "{stamp} {tag} {} entries, {online} reporting",
        index.len()
    )
}

fn failure_line(status: &UpdateStatus, color: bool) -> String {
    let stamp = Local::now().format("%H:%M:%S");
    let tag = if color {
        "failed".red().to_string()
    } else {
        "failed".to_owned()
    };
    format!(
        "{stamp} {tag} ({} in a row): {}",
        status.consecutive_failures,
        status.last_error.as_deref().unwrap_or("unknown error")
    )
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = util::replay_coordinator(&args.payloads, global)?;
    coordinator.start().await?;

    let printer = Printer::new(global);
    let color = printer.color();
    let mut updates = coordinator.watch();
    let mut status = coordinator.status();
    printer.line(&update_line(updates.current(), color));

    let mut seen = 0usize;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if args.max_updates.is_some_and(|max| seen >= max) {
            break;
        }
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
            Some(index) = updates.changed() => {
                seen += 1;
                printer.line(&update_line(&index, color));
            }
            Ok(()) = status.changed() => {
                let current = status.borrow_and_update().clone();
                if !current.last_update_success {
                    printer.line(&failure_line(&current, color));
                }
            }
            else => break,
        }
    }

    coordinator.shutdown().await;
    Ok(())
}
