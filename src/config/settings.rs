//! User settings for Trackr
//!
//! Manages client preferences: which backend to talk to, the theme
//! preference, money/date formatting, and the API schema revision.

use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::paths::TrackrPaths;
use crate::error::TrackrError;

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the terminal (default)
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = TrackrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" | "auto" => Ok(Theme::System),
            other => Err(TrackrError::Validation(format!(
                "Unknown theme '{}'. Use light, dark or system.",
                other
            ))),
        }
    }
}

/// Which wire format the backend speaks
///
/// `Current` logs in by email and labels transactions `income`/`expense`.
/// `Legacy` logs in by username and labels them `CREDIT`/`DEBIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRevision {
    #[default]
    Current,
    Legacy,
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRevision::Current => write!(f, "current"),
            SchemaRevision::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for SchemaRevision {
    type Err = TrackrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(SchemaRevision::Current),
            "legacy" => Ok(SchemaRevision::Legacy),
            other => Err(TrackrError::Validation(format!(
                "Unknown schema revision '{}'. Use current or legacy.",
                other
            ))),
        }
    }
}

/// User settings for Trackr
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base URL of the Trackr backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Theme preference
    #[serde(default)]
    pub theme: Theme,

    /// Wire format spoken by the backend
    #[serde(default)]
    pub schema_revision: SchemaRevision,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest statement file accepted for upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// How long a fetched query stays fresh, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_upload_mb() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            api_base_url: default_api_base_url(),
            theme: Theme::default(),
            schema_revision: SchemaRevision::default(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            request_timeout_secs: default_request_timeout(),
            max_upload_mb: default_max_upload_mb(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &TrackrPaths) -> Result<Self, TrackrError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TrackrError::Io(format!("Failed to read settings file: {}", e)))?;

            let mut settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TrackrError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            if !is_valid_date_format(&settings.date_format) {
                warn!(format = %settings.date_format, "invalid date format in settings, using default");
                settings.date_format = default_date_format();
            }

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackrPaths) -> Result<(), TrackrError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrackrError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TrackrError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Set the API base URL after checking it looks like an HTTP(S) URL
    pub fn set_api_base_url(&mut self, url: &str) -> Result<(), TrackrError> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TrackrError::Validation(format!(
                "API URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        self.api_base_url = url.to_string();
        Ok(())
    }

    /// Set the strftime date format after checking chrono can render it
    pub fn set_date_format(&mut self, format: &str) -> Result<(), TrackrError> {
        if !is_valid_date_format(format) {
            return Err(TrackrError::Validation(format!(
                "Invalid date format '{}'",
                format
            )));
        }
        self.date_format = format.to_string();
        Ok(())
    }

    /// Upload size limit in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Whether chrono can render a date with this strftime format
pub fn is_valid_date_format(format: &str) -> bool {
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 1, 31) else {
        return false;
    };
    let mut rendered = String::new();
    !format.trim().is_empty() && write!(rendered, "{}", sample.format(format)).is_ok()
}
