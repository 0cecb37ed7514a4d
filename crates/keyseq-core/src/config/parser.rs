// Keyseq Config API - TOML Keymap Parser
// Parses keymap.toml into options and action bindings

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::binding::Binding;
use crate::config::binding_parser::BindingParser;
use crate::config::options::KeyBindingOptions;
use crate::dispatch::{Callback, KeyBindingMap};
use crate::input::EventKind;
use crate::modifier::Platform;

/// Accepted range for `options.timeout`, in milliseconds
pub const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=60_000;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Timeout value out of range: {0}")]
    TimeoutOutOfRange(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}

/// Root TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub options: Option<OptionsToml>,

    /// Binding string to action name, in file order
    #[serde(default)]
    pub bindings: IndexMap<String, String>,
}

/// `[options]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsToml {
    /// Sequence timeout in milliseconds
    pub timeout: Option<u64>,
    pub event: Option<EventKind>,
    /// `"apple"` or `"other"`; the running platform when absent
    pub platform: Option<String>,
}

/// Parsed keymap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timeout: Duration,
    pub event: EventKind,
    pub platform: Option<Platform>,
    /// Binding string to action name, in file order
    pub bindings: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: crate::config::DEFAULT_TIMEOUT,
            event: EventKind::KeyDown,
            platform: None,
            bindings: IndexMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        toml_config.to_config()
    }

    /// Get the default keymap path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyseq").join("keymap.toml"))
    }

    /// Load from default location (~/.config/keyseq/keymap.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_toml_path(path);
            }
        }
        Ok(Self::default())
    }

    /// Subscription options described by this file
    pub fn options(&self) -> KeyBindingOptions {
        let mut options = KeyBindingOptions::default()
            .with_timeout(self.timeout)
            .with_event(self.event);
        if let Some(platform) = self.platform {
            options = options.with_platform(platform);
        }
        options
    }

    /// Parse every binding string for the configured platform
    pub fn parsed_bindings(&self) -> Vec<(Binding, &str)> {
        let mut parser = BindingParser::new(self.options().platform);
        self.bindings
            .iter()
            .map(|(binding, action)| (parser.parse(binding), action.as_str()))
            .collect()
    }

    /// Build a binding map, asking `make` for the callback of each action
    pub fn binding_map<F>(&self, mut make: F) -> KeyBindingMap
    where
        F: FnMut(&str) -> Callback,
    {
        let mut map = KeyBindingMap::new();
        for (binding, action) in &self.bindings {
            map.insert(binding.clone(), make(action));
        }
        map
    }
}

impl ConfigToml {
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(options) = &self.options {
            if let Some(ms) = options.timeout {
                if !TIMEOUT_RANGE_MS.contains(&ms) {
                    return Err(ConfigError::TimeoutOutOfRange(format!(
                        "timeout must be {}-{}ms, got {}",
                        TIMEOUT_RANGE_MS.start(),
                        TIMEOUT_RANGE_MS.end(),
                        ms
                    )));
                }
                config.timeout = Duration::from_millis(ms);
            }
            if let Some(event) = options.event {
                config.event = event;
            }
            if let Some(name) = &options.platform {
                let platform = name
                    .parse::<Platform>()
                    .map_err(|_| ConfigError::UnknownPlatform(name.clone()))?;
                config.platform = Some(platform);
            }
        }

        for (binding, action) in &self.bindings {
            if binding.trim().is_empty() || action.trim().is_empty() {
                log::warn!(
                    "Skipping keymap entry with empty binding or action: {:?} = {:?}",
                    binding,
                    action
                );
                continue;
            }
            config.bindings.insert(binding.clone(), action.clone());
        }

        log::debug!(
            "Parsed keymap config: {} bindings, timeout {:?}",
            config.bindings.len(),
            config.timeout
        );
        Ok(config)
    }
}
