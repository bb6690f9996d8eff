//! Export settings: date format, time zone and session count labels.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ExportError, Result};

pub const DEFAULT_DATE_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Message key for the singular session count label.
pub const SESSION_LABEL_KEY: &str = "sessionLabel";
/// Message key for the plural session count label.
pub const SESSIONS_LABEL_KEY: &str = "sessionsLabel";

/// Time zone used when rendering session dates into file names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

impl TimeZoneMode {
    /// Parse a time zone mode from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            _ => Err(ExportError::ConfigError(format!("Unknown time zone: {}", s))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// strftime pattern used for dates in file names
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Render dates in local time or UTC
    #[serde(default)]
    pub time_zone: TimeZoneMode,

    /// Label used after the count when exactly one session is exported
    #[serde(default = "default_session_label")]
    pub session_label: String,

    /// Label used after the count when several sessions are exported
    #[serde(default = "default_sessions_label")]
    pub sessions_label: String,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_session_label() -> String {
    "session".to_string()
}

fn default_sessions_label() -> String {
    "sessions".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            time_zone: TimeZoneMode::default(),
            session_label: default_session_label(),
            sessions_label: default_sessions_label(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: ExportConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path: ~/.config/cli-programs/sessport.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ExportError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/cli-programs/sessport.toml"))
    }

    /// Format a date with the configured pattern and time zone
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.date_format, self.time_zone)
    }
}

/// Looks up user-facing strings by message key.
pub trait Localizer: Send + Sync {
    fn message(&self, key: &str) -> String;
}

impl Localizer for ExportConfig {
    fn message(&self, key: &str) -> String {
        match key {
            SESSION_LABEL_KEY => self.session_label.clone(),
            SESSIONS_LABEL_KEY => self.sessions_label.clone(),
            _ => key.to_string(),
        }
    }
}

/// Render `date` with a strftime `pattern`.
///
/// Patterns chrono cannot parse fall back to [`DEFAULT_DATE_FORMAT`], so a bad
/// user setting never aborts an export.
pub fn format_date(date: &DateTime<Utc>, pattern: &str, time_zone: TimeZoneMode) -> String {
    let pattern = if is_valid_pattern(pattern) {
        pattern
    } else {
        log::warn!(
            "Invalid date format {:?}, using {:?}",
            pattern,
            DEFAULT_DATE_FORMAT
        );
        DEFAULT_DATE_FORMAT
    };

    match time_zone {
        TimeZoneMode::Utc => date.format(pattern).to_string(),
        TimeZoneMode::Local => date.with_timezone(&Local).format(pattern).to_string(),
    }
}

fn is_valid_pattern(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}
