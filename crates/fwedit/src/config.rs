//! CLI configuration -- thin wrapper around `fwedit_config`.
//!
//! Merges the loaded `Config` with `GlobalOpts`; flags win over file and
//! environment values.

use clap::ValueEnum;

use fwedit_core::IndexMode;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fwedit_config::{Config, config_path, load_config, save_config};

/// Effective settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputFormat,
    pub color: ColorMode,
    pub quiet: bool,
    pub index_mode: IndexMode,
    pub enforce_ip_masks: bool,
}

impl Settings {
    pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(output) => output,
            None => parse_value_enum("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(color) => color,
            None => parse_value_enum("defaults.color", &config.defaults.color)?,
        };
        let index_mode = if global.strict || config.editor.strict_indices {
            IndexMode::Strict
        } else {
            IndexMode::Lenient
        };

        Ok(Self {
            output,
            color,
            quiet: global.quiet,
            index_mode,
            enforce_ip_masks: config.editor.enforce_ip_masks,
        })
    }
}

fn parse_value_enum<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn global() -> GlobalOpts {
        GlobalOpts {
            output: None,
            color: None,
            verbose: 0,
            quiet: false,
            strict: false,
        }
    }

    #[test]
    fn config_values_fill_missing_flags() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        cfg.editor.strict_indices = true;

        let settings = Settings::resolve(&global(), &cfg).unwrap();
        assert_eq!(settings.output, OutputFormat::Yaml);
        assert_eq!(settings.color, ColorMode::Auto);
        assert_eq!(settings.index_mode, IndexMode::Strict);
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();

        let opts = GlobalOpts {
            output: Some(OutputFormat::Json),
            strict: true,
            ..global()
        };
        let settings = Settings::resolve(&opts, &cfg).unwrap();
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.index_mode, IndexMode::Strict);
    }

    #[test]
    fn unknown_config_output_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        assert!(matches!(
            Settings::resolve(&global(), &cfg),
            Err(CliError::Validation { .. })
        ));
    }
}
