//! Path management for Trackr
//!
//! Resolves where the client keeps its settings, stored credentials and
//! pending statement previews.
//!
//! ## Path Resolution Order
//!
//! 1. `TRACKR_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (e.g. `~/.config/trackr` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::TrackrError;

/// Manages all paths used by Trackr
#[derive(Debug, Clone)]
pub struct TrackrPaths {
    /// Base directory for all Trackr state
    base_dir: PathBuf,
}

impl TrackrPaths {
    /// Create a new TrackrPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined.
    pub fn new() -> Result<Self, TrackrError> {
        let base_dir = if let Ok(custom) = std::env::var("TRACKR_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create TrackrPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the stored access/refresh tokens
    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join("credentials.json")
    }

    /// Get the path to the statement preview awaiting commit
    pub fn preview_file(&self) -> PathBuf {
        self.base_dir.join("pending_preview.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), TrackrError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TrackrError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, TrackrError> {
    ProjectDirs::from("", "", "trackr")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| TrackrError::Config("Could not determine a config directory".into()))
}
