//! `send` handler: dispatch one command through the replay client.

use serde::Serialize;

use omnilogic_core::model::{ColorLogicBrightness, ColorLogicShow, ColorLogicSpeed};
use omnilogic_core::{Command, CommandResult, EntityIndexEntry};

use crate::cli::{GlobalOpts, SendAction, SendArgs};
use crate::error::CliError;
use crate::output::Printer;

use super::util;

impl From<SendAction> for Command {
    fn from(action: SendAction) -> Self {
        match action {
            SendAction::On => Command::TurnOn,
            SendAction::Off => Command::TurnOff,
            SendAction::Speed { percent } => Command::SetSpeed { percent },
            SendAction::Preset { preset } => Command::SetSpeedPreset { preset },
            SendAction::Show {
                show,
                speed,
                brightness,
            } => Command::SetLightShow {
                show: show.map(ColorLogicShow::from),
                speed: speed.map(ColorLogicSpeed::from),
                brightness: brightness.map(ColorLogicBrightness::from),
            },
            SendAction::Heat { temperature } => Command::SetHeaterTemperature { temperature },
            SendAction::Enable => Command::SetHeaterEnabled { enabled: true },
            SendAction::Disable => Command::SetHeaterEnabled { enabled: false },
            SendAction::Restore => Command::RestoreIdle,
        }
    }
}

#[derive(Serialize)]
struct Outcome {
    command: Command,
    #[serde(flatten)]
    result: CommandResult,
    entry: Option<EntityIndexEntry>,
}

fn detail(outcome: &Outcome) -> String {
    let status = match &outcome.result {
        CommandResult::Applied => "applied".to_owned(),
        CommandResult::Sent => "sent".to_owned(),
        CommandResult::Unconfirmed { reason } => format!("sent, unconfirmed ({reason})"),
    };
    match &outcome.entry {
        Some(entry) => format!(
            "{} {status}: {} ({}) is now {}",
            outcome.command.name(),
            entry.msp_config.name,
            entry.system_id(),
            util::state_summary(entry)
        ),
        None => format!("{} {status}", outcome.command.name()),
    }
}

pub async fn handle(args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = util::replay_coordinator(&args.payloads, global)?;
    coordinator.start().await?;

    let command = Command::from(args.action);
    let dispatched = coordinator
        .dispatch_command(args.system_id, command.clone())
        .await;
    let index = coordinator.index();
    coordinator.shutdown().await;

    let outcome = Outcome {
        command,
        result: dispatched?,
        entry: index.get(args.system_id).cloned(),
    };
    Printer::new(global).single(&outcome, detail, |o| {
        o.entry.as_ref().map(util::state_summary).unwrap_or_default()
    })
}
