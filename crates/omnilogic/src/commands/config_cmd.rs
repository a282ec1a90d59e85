//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output::Printer;

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: profile from flags ────────────────────────────────
        ConfigCommand::Init { name } => {
            let mut cfg = config::load_config()?;

            let mut profile = match cfg.profiles.get(&name) {
                Some(existing) => existing.clone(),
                None => Profile::new(global.host.clone().ok_or_else(|| CliError::Validation {
                    field: "host".into(),
                    reason: "pass --host (or set OMNILOGIC_HOST) to create a profile".into(),
                })?),
            };
            config::apply_overrides(&mut profile, global);

            // Refuse to save anything the coordinator would reject.
            config::profile_to_coordinator_config(&profile, &cfg.defaults)?;

            cfg.profiles.insert(name.clone(), profile);
            if cfg
                .default_profile
                .as_ref()
                .is_none_or(|d| !cfg.profiles.contains_key(d))
            {
                cfg.default_profile = Some(name.clone());
            }
            let path = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Profile '{name}' saved to {}", path.display());
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let printer = Printer::new(global);
            match printer.format() {
                OutputFormat::Table | OutputFormat::Plain => {
                    printer.line(toml::to_string_pretty(&cfg)?.trim_end());
                    Ok(())
                }
                _ => printer.single(&cfg, |_| String::new(), |_| String::new()),
            }
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            Printer::new(global).line(&config::config_path().display().to_string());
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg: Config = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
