//! Authentication payloads
//!
//! Login and registration bodies differ between the two backend schema
//! revisions, so they are rendered to JSON through `to_payload` instead of
//! a derived `Serialize`. Passwords are held in zeroizing buffers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::config::SchemaRevision;
use crate::error::{TrackrError, TrackrResult};

/// Minimum password length enforced before a registration is sent
pub const MIN_PASSWORD_LEN: usize = 8;

/// Access token plus optional refresh token issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl AuthTokens {
    /// Find tokens in a login/register/refresh response
    ///
    /// Accepts `{access, refresh}`, `{tokens: {access, refresh}}`,
    /// `{access_token, refresh_token}` and `{token}`. Returns `None` when
    /// the response carries no access token (e.g. registration without
    /// auto-login).
    pub fn from_response(value: &Value) -> Option<Self> {
        if let Some(nested) = value.get("tokens") {
            if let Some(tokens) = Self::from_response(nested) {
                return Some(tokens);
            }
        }

        let access = ["access", "access_token", "token"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())?;

        let refresh = ["refresh", "refresh_token"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            access: access.to_string(),
            refresh,
        })
    }
}

/// Credentials for `POST /api/auth/login/`
pub struct LoginRequest {
    /// Email (current revision) or username (legacy revision)
    pub identifier: String,
    pub password: Zeroizing<String>,
}

impl LoginRequest {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn validate(&self) -> TrackrResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(TrackrError::Validation("Email or username is required".into()));
        }
        if self.password.is_empty() {
            return Err(TrackrError::Validation("Password is required".into()));
        }
        Ok(())
    }

    pub fn to_payload(&self, revision: SchemaRevision) -> Value {
        let key = match revision {
            SchemaRevision::Current => "email",
            SchemaRevision::Legacy => "username",
        };
        let mut body = Map::new();
        body.insert(key.into(), Value::from(self.identifier.trim()));
        body.insert("password".into(), Value::from(self.password.as_str()));
        Value::Object(body)
    }
}

/// Fields for `POST /api/auth/register/`
pub struct RegisterRequest {
    pub email: String,
    /// Required by the legacy revision, optional otherwise
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Zeroizing<String>,
    pub password_confirm: Zeroizing<String>,
}

impl RegisterRequest {
    pub fn validate(&self, revision: SchemaRevision) -> TrackrResult<()> {
        if !is_plausible_email(&self.email) {
            return Err(TrackrError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }

        if revision == SchemaRevision::Legacy
            && self.username.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(TrackrError::Validation("Username is required".into()));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TrackrError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.password.as_str() != self.password_confirm.as_str() {
            return Err(TrackrError::Validation("Passwords do not match".into()));
        }

        Ok(())
    }

    pub fn to_payload(&self, revision: SchemaRevision) -> Value {
        let mut body = Map::new();
        body.insert("email".into(), Value::from(self.email.trim()));
        body.insert("password".into(), Value::from(self.password.as_str()));

        match revision {
            SchemaRevision::Current => {
                body.insert(
                    "password2".into(),
                    Value::from(self.password_confirm.as_str()),
                );
            }
            SchemaRevision::Legacy => {}
        }

        if let Some(username) = self.username.as_deref().map(str::trim) {
            if !username.is_empty() {
                body.insert("username".into(), Value::from(username));
            }
        }
        if let Some(first) = &self.first_name {
            body.insert("first_name".into(), Value::from(first.trim()));
        }
        if let Some(last) = &self.last_name {
            body.insert("last_name".into(), Value::from(last.trim()));
        }

        Value::Object(body)
    }
}

/// Loose shape check: something@domain.tld with no whitespace
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            email: "new@example.com".into(),
            username: None,
            first_name: Some("New".into()),
            last_name: None,
            password: Zeroizing::new(password.into()),
            password_confirm: Zeroizing::new(confirm.into()),
        }
    }

    #[test]
    fn test_tokens_flat() {
        let tokens = AuthTokens::from_response(&json!({"access": "a", "refresh": "r"})).unwrap();
        assert_eq!(tokens.access, "a");
        assert_eq!(tokens.refresh.as_deref(), Some("r"));
    }

    #[test]
    fn test_tokens_nested() {
        let body = json!({"user": {"id": 1}, "tokens": {"access": "a", "refresh": "r"}});
        let tokens = AuthTokens::from_response(&body).unwrap();
        assert_eq!(tokens.access, "a");
    }

    #[test]
    fn test_tokens_single_token_key() {
        let tokens = AuthTokens::from_response(&json!({"token": "t"})).unwrap();
        assert_eq!(tokens.access, "t");
        assert!(tokens.refresh.is_none());
    }

    #[test]
    fn test_no_tokens() {
        assert!(AuthTokens::from_response(&json!({"id": 1, "email": "x@y.z"})).is_none());
    }

    #[test]
    fn test_login_payload_by_revision() {
        let login = LoginRequest::new("ada@example.com", "secret");
        assert_eq!(
            login.to_payload(SchemaRevision::Current),
            json!({"email": "ada@example.com", "password": "secret"})
        );
        assert_eq!(
            login.to_payload(SchemaRevision::Legacy),
            json!({"username": "ada@example.com", "password": "secret"})
        );
    }

    #[test]
    fn test_login_validation() {
        assert!(LoginRequest::new("", "pw").validate().is_err());
        assert!(LoginRequest::new("ada", "").validate().is_err());
        assert!(LoginRequest::new("ada", "pw").validate().is_ok());
    }

    #[test]
    fn test_register_validation() {
        assert!(register("longenough", "longenough")
            .validate(SchemaRevision::Current)
            .is_ok());
        assert!(register("short", "short")
            .validate(SchemaRevision::Current)
            .is_err());
        assert!(register("longenough", "different")
            .validate(SchemaRevision::Current)
            .is_err());
        // legacy revision needs a username
        assert!(register("longenough", "longenough")
            .validate(SchemaRevision::Legacy)
            .is_err());
    }

    #[test]
    fn test_register_payload() {
        let payload = register("longenough", "longenough").to_payload(SchemaRevision::Current);
        assert_eq!(payload["password2"], "longenough");
        assert_eq!(payload["first_name"], "New");
        assert!(payload.get("username").is_none());

        let legacy = register("longenough", "longenough").to_payload(SchemaRevision::Legacy);
        assert!(legacy.get("password2").is_none());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a b@c.de"));
        assert!(!is_plausible_email("a@@c.de"));
    }
}
