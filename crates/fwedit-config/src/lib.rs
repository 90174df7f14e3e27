//! Configuration for the fwedit CLI.
//!
//! TOML file in the platform config directory, layered under `FWEDIT_`
//! environment variables. Command-line flags are applied on top by the
//! binary.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Rule editor behaviour.
    #[serde(default)]
    pub editor: EditorSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorSettings {
    /// Report edit actions on missing or deleted rules as errors instead
    /// of ignoring them.
    #[serde(default)]
    pub strict_indices: bool,

    /// Append `/32` or `/128` to bare addresses before validation.
    #[serde(default = "default_true")]
    pub enforce_ip_masks: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            strict_indices: false,
            enforce_ip_masks: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Set one value by dotted key, e.g. `editor.strict_indices`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "defaults.output" | "output" => self.defaults.output = value.into(),
            "defaults.color" | "color" => self.defaults.color = value.into(),
            "editor.strict_indices" | "strict_indices" => {
                self.editor.strict_indices = parse_bool(key, value)?;
            }
            "editor.enforce_ip_masks" | "enforce_ip_masks" => {
                self.editor.enforce_ip_masks = parse_bool(key, value)?;
            }
            other => {
                return Err(ConfigError::Validation {
                    field: other.into(),
                    reason: "unknown config key. Valid keys: defaults.output, defaults.color, \
                             editor.strict_indices, editor.enforce_ip_masks"
                        .into(),
                });
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: key.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fwedit", "fwedit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fwedit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering the environment on top.
///
/// Nested keys use a double underscore:
/// `FWEDIT_EDITOR__STRICT_INDICES=true`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FWEDIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.color, "auto");
        assert!(!cfg.editor.strict_indices);
        assert!(cfg.editor.enforce_ip_masks);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nstrict_indices = true\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert!(cfg.editor.strict_indices);
        assert!(cfg.editor.enforce_ip_masks);
        assert_eq!(cfg.defaults, Defaults::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set("defaults.output", "json").unwrap();
        cfg.set("editor.enforce_ip_masks", "false").unwrap();
        save_config_to(&path, &cfg).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor\nstrict_indices = ").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_bools() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("editor.colour", "x"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            cfg.set("strict_indices", "yes"),
            Err(ConfigError::Validation { .. })
        ));
        assert_eq!(cfg, Config::default());
    }
}
