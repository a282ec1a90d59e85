mod cli;
mod commands;
mod config;
mod error;
mod output;
mod replay;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GlobalOpts};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    tracing::debug!(command = ?cli.command, "dispatching command");
    match commands::dispatch(cli.command, &cli.global).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = u8::try_from(err.exit_code()).unwrap_or(1);
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

/// Our own crates follow `-v`; dependencies stay at warn until `-vvv`.
fn default_directives(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "warn,omnilogic=info,omnilogic_core=info,omnilogic_config=info",
        2 => "warn,omnilogic=debug,omnilogic_core=debug,omnilogic_config=debug",
        _ => "trace",
    }
}

fn init_tracing(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(global)));

    // stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
