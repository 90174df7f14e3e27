//! Config subcommand handlers.

use std::fmt::Write;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Settings};
use crate::error::CliError;
use crate::output;

/// Format config as TOML-like text for display.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out);
    let _ = writeln!(out, "[editor]");
    let _ = writeln!(out, "strict_indices = {}", cfg.editor.strict_indices);
    let _ = write!(out, "enforce_ip_masks = {}", cfg.editor.enforce_ip_masks);
    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let settings = Settings::resolve(global, &cfg)?;
            let out = output::render_single(settings.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("✓ Configuration written to {}", written.display());
            }
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            cfg.set(&key, &value)?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} = {value}");
            }
            Ok(())
        }
    }
}
