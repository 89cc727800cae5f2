//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::progress::redemption::DEFAULT_PREFIX;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TREASURE_HUNT_CONFIG_PATH";
/// Longest display name accepted at registration when the file does not say otherwise.
const DEFAULT_DISPLAY_NAME_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    redemption_prefix: String,
    display_name_max_len: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        prefix = %app_config.redemption_prefix,
                        "loaded hunt settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Prefix prepended to every redemption code.
    pub fn redemption_prefix(&self) -> &str {
        &self.redemption_prefix
    }

    /// Maximum number of characters allowed in a display name.
    pub fn display_name_max_len(&self) -> usize {
        self.display_name_max_len
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redemption_prefix: DEFAULT_PREFIX.to_owned(),
            display_name_max_len: DEFAULT_DISPLAY_NAME_MAX_LEN,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    redemption_prefix: Option<String>,
    #[serde(default)]
    display_name_max_len: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            redemption_prefix: value
                .redemption_prefix
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.redemption_prefix),
            display_name_max_len: value
                .display_name_max_len
                .filter(|len| *len > 0)
                .unwrap_or(defaults.display_name_max_len),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
