//! Session configuration
//!
//! Window defaults and the vigilance-state catalog, stored as YAML.
//! Default location: `<config dir>/somno/session.yaml`.
//!
//! Missing or unreadable files fall back to defaults with a warning;
//! an *invalid* state catalog (bad shortcut table) is fatal to session
//! startup, never a runtime scoring failure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{ConfigError, StateCatalog};

/// Root session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display window size in seconds
    pub display_window: f64,
    /// Scoring window size in seconds
    pub scoring_window: f64,
    /// Keep the scoring window equal to the display window
    pub lock_scoring_to_display: bool,
    /// Quantization step for display-window starts (seconds)
    pub slider_step: f64,
    /// Offset added to scoring-window starts when seeking video (seconds)
    pub video_offset: f64,
    /// Vigilance-state catalog
    pub states: StateCatalog,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_window: 30.0,
            scoring_window: 30.0,
            lock_scoring_to_display: true,
            slider_step: 1.0,
            video_offset: 0.0,
            states: StateCatalog::default(),
        }
    }
}

/// Get the default session config file path
///
/// Returns: `<config dir>/somno/session.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("somno")
        .join("session.yaml")
}

/// Load a session config from a YAML file
///
/// Missing file: defaults. Unreadable/unparsable file: warn + defaults.
/// A catalog that fails validation is returned as `ConfigError` and
/// must abort startup.
pub fn load_session_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let config = if !path.exists() {
        log::info!("load_session_config: {:?} does not exist, using defaults", path);
        SessionConfig::default()
    } else {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<SessionConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("load_session_config: failed to parse: {}, using defaults", e);
                    SessionConfig::default()
                }
            },
            Err(e) => {
                log::warn!("load_session_config: failed to read file: {}, using defaults", e);
                SessionConfig::default()
            }
        }
    };
    config.states.validate()?;
    Ok(config)
}

/// Save a session config to a YAML file
pub fn save_session_config(config: &SessionConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(path, yaml)?;
    log::info!("save_session_config: saved to {:?}", path);
    Ok(())
}
