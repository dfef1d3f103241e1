//! User profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// The signed-in user as returned by `/api/auth/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    #[serde(default)]
    pub email: String,

    /// Present on backends that log in by username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// Avatar image URL
    #[serde(default, alias = "avatar_url", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// Full name, falling back to the username and then the email
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }

        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => self.email.clone(),
        }
    }
}

/// Fields accepted by `PATCH /api/users/me/`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
    }
}
