//! Configuration module for Trackr
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence
//! - Theme and API schema preferences

pub mod paths;
pub mod settings;

pub use paths::TrackrPaths;
pub use settings::{SchemaRevision, Settings, Theme};
