//! # Configuration
//!
//! Settings resolve with a clear override hierarchy:
//! defaults → config file → env vars.
//!
//! Config lives at `<config dir>/sbox/config.json` and is created by
//! `sbox register <name>`:
//!
//! ```json
//! { "Project": "help-jp" }
//! ```
//!
//! `BaseUrl` and `AccentColor` (`#rrggbb`) are optional.

use log::{debug, info, warn};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::scrapbox::{DEFAULT_BASE_URL, Project};

// ============================================================================
// Config Struct
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(rename = "Project", alias = "project")]
    pub project: String,
    #[serde(rename = "BaseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "AccentColor", default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ACCENT: Color = Color::Rgb(0x17, 0xc0, 0xeb);

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub project_name: String,
    pub base_url: String,
    pub accent: Color,
}

impl ResolvedConfig {
    pub fn project(&self) -> Project {
        Project::new(self.project_name.as_str(), self.base_url.as_str())
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    /// The platform has no per-user config directory.
    NoConfigDir,
    /// No config file at the given path; nothing was registered yet.
    Missing(PathBuf),
    Io(io::Error),
    Parse(serde_json::Error),
    EmptyProject,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "could not determine the config directory"),
            ConfigError::Missing(path) => write!(
                f,
                "Register your project name first! (no config at {})",
                path.display()
            ),
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "Your config file is not valid! ({e})"),
            ConfigError::EmptyProject => write!(f, "project name is required"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Loading / Saving
// ============================================================================

/// Returns the path to `<config dir>/sbox/config.json`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sbox").join("config.json"))
}

fn require_config_path() -> Result<PathBuf, ConfigError> {
    config_path().ok_or_else(|| {
        warn!("Could not determine config directory");
        ConfigError::NoConfigDir
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&require_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file at {}", path.display());
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: Config = serde_json::from_str(&contents).map_err(ConfigError::Parse)?;
    if config.project.trim().is_empty() {
        return Err(ConfigError::EmptyProject);
    }
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&require_config_path()?, config)
}

/// Writes the config as pretty JSON (via `.tmp` + rename).
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config).map_err(ConfigError::Parse)?;
    fs::write(&tmp_path, json).map_err(ConfigError::Io)?;
    fs::rename(&tmp_path, path).map_err(ConfigError::Io)?;
    info!("Saved config to {}", path.display());
    Ok(())
}

/// Registers `name` as the project, keeping any other settings already on disk.
pub fn register_project(name: &str) -> Result<Config, ConfigError> {
    register_project_at(&require_config_path()?, name)
}

pub fn register_project_at(path: &Path, name: &str) -> Result<Config, ConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::EmptyProject);
    }
    let mut config = match load_config_from(path) {
        Ok(existing) => existing,
        Err(e) => {
            debug!("Starting from an empty config: {}", e);
            Config::default()
        }
    };
    config.project = name.to_string();
    save_config_to(path, &config)?;
    Ok(config)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars.
pub fn resolve(config: &Config) -> ResolvedConfig {
    // Base URL: env → config → default
    let base_url = std::env::var("SBOX_BASE_URL")
        .ok()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Accent: env → config → default. Unparseable values fall back.
    let accent = std::env::var("SBOX_ACCENT_COLOR")
        .ok()
        .or_else(|| config.accent_color.clone())
        .and_then(|hex| {
            let color = parse_hex_color(&hex);
            if color.is_none() {
                warn!("Ignoring invalid accent color '{}'", hex);
            }
            color
        })
        .unwrap_or(DEFAULT_ACCENT);

    ResolvedConfig {
        project_name: config.project.trim().to_string(),
        base_url,
        accent,
    }
}

/// Parses `#rrggbb` (the `#` is optional).
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_config_parses() {
        let config: Config = serde_json::from_str(r#"{"Project": "help-jp"}"#).unwrap();
        assert_eq!(config.project, "help-jp");
        assert!(config.base_url.is_none());
        assert!(config.accent_color.is_none());
    }

    #[test]
    fn test_config_serializes_without_empty_options() {
        let config = Config {
            project: "help-jp".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"Project":"help-jp"}"#);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sbox").join("config.json");
        let config = Config {
            project: "my-notes".to_string(),
            base_url: Some("http://localhost:9000/api".to_string()),
            accent_color: Some("#ff8800".to_string()),
        };

        save_config_to(&path, &config).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().starts_with("Register your project name first!"));
    }

    #[test]
    fn test_invalid_config_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "Project = help-jp").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_blank_project_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"Project": "  "}"#).unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::EmptyProject)));
    }

    #[test]
    fn test_register_creates_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sbox").join("config.json");
        let config = register_project_at(&path, " help-jp \n").unwrap();
        assert_eq!(config.project, "help-jp");
        assert_eq!(load_config_from(&path).unwrap().project, "help-jp");
    }

    #[test]
    fn test_register_keeps_other_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r##"{"Project": "old", "AccentColor": "#000000"}"##).unwrap();

        let config = register_project_at(&path, "new").unwrap();
        assert_eq!(config.project, "new");
        assert_eq!(config.accent_color.as_deref(), Some("#000000"));
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(register_project_at(&path, "   "), Err(ConfigError::EmptyProject)));
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_uses_defaults() {
        let config = Config {
            project: "help-jp".to_string(),
            ..Default::default()
        };
        let resolved = resolve(&config);
        assert_eq!(resolved.project_name, "help-jp");
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.accent, DEFAULT_ACCENT);
        assert_eq!(resolved.project().name, "help-jp");
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = Config {
            project: "help-jp".to_string(),
            base_url: Some("http://localhost:9000/api/".to_string()),
            accent_color: Some("#FF8800".to_string()),
        };
        let resolved = resolve(&config);
        assert_eq!(resolved.accent, Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(resolved.project().base_url, "http://localhost:9000/api");
    }

    #[test]
    fn test_invalid_accent_falls_back() {
        let config = Config {
            project: "p".to_string(),
            accent_color: Some("teal".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&config).accent, DEFAULT_ACCENT);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#17c0eb"), Some(DEFAULT_ACCENT));
        assert_eq!(parse_hex_color("17C0EB"), Some(DEFAULT_ACCENT));
        assert_eq!(parse_hex_color("#17c0e"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }
}
