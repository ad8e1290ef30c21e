//! Configuration management.
//!
//! Settings are loaded from a TOML file under `config/` and can be
//! overridden by environment variables prefixed with `KEYCHORD_`, using `__`
//! for nesting. Example: `KEYCHORD_APPLICATION__LOG_LEVEL=debug`.
//!
//! Shortcut bindings declared in configuration carry their chord as a plain
//! string; [`Settings::validate`] parses every declared chord so malformed
//! ones are rejected at startup instead of at dispatch time.

use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::chord::KeyChord;
use crate::error::{AppResult, KeychordError};
use crate::input::DEFAULT_SUBSCRIBER_CAPACITY;

/// Top-level settings for the shortcut service.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Application-level settings.
    pub application: ApplicationSettings,
    /// Dispatcher channel tuning.
    #[serde(default)]
    pub dispatcher: DispatcherSettings,
    /// Shortcut bindings installed at startup.
    #[serde(default)]
    pub shortcuts: Vec<ShortcutDefinition>,
}

/// Application-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Human-readable application name, used in logs.
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Channel capacities and shutdown behavior for the dispatcher task.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherSettings {
    /// Capacity of the dispatcher's command mailbox.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Capacity of each input bus subscriber channel.
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,
    /// How long shutdown waits for the dispatcher to acknowledge, in
    /// milliseconds, before giving up.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_ms: u64,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            subscriber_capacity: default_subscriber_capacity(),
            shutdown_timeout_ms: default_shutdown_timeout(),
        }
    }
}

/// One shortcut declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortcutDefinition {
    /// Unique binding id.
    pub id: String,
    /// Chord string, e.g. `"ctrl+h"`.
    pub chord: String,
    /// Confirmation text shown when the shortcut fires. Defaults to the
    /// built-in logout prompt when omitted.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Whether the shortcut is installed at startup.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mailbox_capacity() -> usize {
    32
}

fn default_subscriber_capacity() -> usize {
    DEFAULT_SUBSCRIBER_CAPACITY
}

fn default_shutdown_timeout() -> u64 {
    5000
}

fn default_enabled() -> bool {
    true
}

impl Settings {
    /// Loads `config/<name>.toml` (default `config/default.toml`) merged
    /// with `KEYCHORD_` environment overrides.
    pub fn new(config_name: Option<&str>) -> AppResult<Self> {
        let config_path = format!("config/{}", config_name.unwrap_or("default"));
        let s = Config::builder()
            .add_source(config::File::with_name(&config_path))
            .add_source(keychord_env())
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Loads settings from an explicit file path, still honoring
    /// environment overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let s = Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(keychord_env())
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Validates settings after loading.
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(KeychordError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.dispatcher.mailbox_capacity == 0 {
            return Err(KeychordError::Configuration(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.subscriber_capacity == 0 {
            return Err(KeychordError::Configuration(
                "subscriber_capacity must be at least 1".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for shortcut in &self.shortcuts {
            if shortcut.id.is_empty() {
                return Err(KeychordError::Configuration(
                    "Shortcut id must not be empty".to_string(),
                ));
            }
            if !ids.insert(&shortcut.id) {
                return Err(KeychordError::Configuration(format!(
                    "Duplicate shortcut id: {}",
                    shortcut.id
                )));
            }
            shortcut.chord.parse::<KeyChord>().map_err(|e| {
                KeychordError::Configuration(format!(
                    "Shortcut '{}' has an invalid chord '{}': {}",
                    shortcut.id, shortcut.chord, e
                ))
            })?;
        }

        Ok(())
    }

    /// All shortcuts that should be installed at startup.
    pub fn enabled_shortcuts(&self) -> Vec<&ShortcutDefinition> {
        self.shortcuts.iter().filter(|s| s.enabled).collect()
    }
}

/// Environment source shared by both load paths.
///
/// A single `_` follows the prefix and `__` separates nested keys, so
/// `KEYCHORD_APPLICATION__LOG_LEVEL` maps to `application.log_level`.
fn keychord_env() -> Environment {
    Environment::with_prefix("KEYCHORD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
