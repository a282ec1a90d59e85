//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod diagnostics;
pub mod index;
pub mod send;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a payload-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Index(args) => index::handle_index(&args, global),
        Command::Show(args) => index::handle_show(&args, global),
        Command::Walk(args) => index::handle_walk(&args, global),
        Command::Send(args) => send::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Diagnostics(args) => diagnostics::handle(&args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = crate::cli::Cli::command();
            generate(args.shell, &mut cmd, "omnilogic", &mut std::io::stdout());
            Ok(())
        }
    }
}
