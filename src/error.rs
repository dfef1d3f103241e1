//! Custom error types for Trackr
//!
//! This module defines the error hierarchy for the client using thiserror
//! for ergonomic error definitions, plus the helper that pulls a
//! human-readable message out of a backend error payload.

use serde_json::Value;
use thiserror::Error;

/// The main error type for Trackr operations
#[derive(Error, Debug)]
pub enum TrackrError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Client-side validation errors (checked before any request is sent)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local storage errors (credentials, pending previews)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A request was rejected after the token refresh already happened
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Tokens were cleared because they could not be refreshed
    #[error("Your session has expired. Run 'trackr auth login' to sign in again.")]
    SessionExpired,

    /// No credentials are stored
    #[error("Not logged in. Run 'trackr auth login' first.")]
    NotLoggedIn,

    /// Login or registration was rejected
    #[error("{0}")]
    Auth(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Statement upload errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl TrackrError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// HTTP status carried by this error, if it came from the backend
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized(_) | Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackrError {
    fn from(err: std::io::Error) -> Self {
        TrackrError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackrError {
    fn from(err: serde_json::Error) -> Self {
        TrackrError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for TrackrError {
    fn from(err: reqwest::Error) -> Self {
        TrackrError::Network(err.to_string())
    }
}

/// Result type alias for Trackr operations
pub type TrackrResult<T> = Result<T, TrackrError>;

/// Top-level keys checked, in order, for a backend error message
const MESSAGE_FIELDS: [&str; 3] = ["detail", "message", "error"];

/// Pull the first available error message out of a backend error body
///
/// Priority: `detail`, `message`, `error`, the first entry of
/// `non_field_errors`, then the first entry of any per-field error array
/// (reported as `field: message`). Returns `None` for bodies that are not
/// JSON or carry none of these shapes.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    message_from_value(&value)
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(message_from_value),
        Value::Object(map) => {
            for field in MESSAGE_FIELDS {
                if let Some(message) = map.get(field).and_then(message_from_value) {
                    return Some(message);
                }
            }

            if let Some(message) = map.get("non_field_errors").and_then(message_from_value) {
                return Some(message);
            }

            map.iter().find_map(|(field, errors)| match errors {
                Value::Array(_) | Value::String(_) => {
                    message_from_value(errors).map(|msg| format!("{}: {}", field, msg))
                }
                _ => None,
            })
        }
        _ => None,
    }
}
