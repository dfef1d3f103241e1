//! Session service
//!
//! Holds who is signed in. The current user lives next to the token store
//! and the two are cleared together, including when the API client gives
//! up on a refresh and drops the tokens on its own.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, AuthApi};
use crate::error::{TrackrError, TrackrResult};
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::storage::StoredTokens;

/// Service for the signed-in user and their tokens
pub struct Session {
    client: Arc<ApiClient>,
    user: Arc<RwLock<Option<User>>>,
}

impl Session {
    /// Create a session bound to a client
    ///
    /// Registers a session-expired hook on the client so that tokens
    /// cleared by a failed refresh also clear the user.
    pub fn new(client: Arc<ApiClient>) -> Self {
        let user: Arc<RwLock<Option<User>>> = Arc::new(RwLock::new(None));
        let hook_user = Arc::clone(&user);
        client.on_session_expired(move || {
            *hook_user.write() = None;
        });
        Self { client, user }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore the session from stored tokens
    ///
    /// Any failure to load the profile clears the tokens. Returns whether a
    /// user is now signed in.
    pub fn init(&self) -> bool {
        if self.client.tokens().access_token().is_none() {
            *self.user.write() = None;
            return false;
        }

        match AuthApi::new(&self.client).me() {
            Ok(user) => {
                debug!(user = %user.email, "session restored");
                *self.user.write() = Some(user);
                true
            }
            Err(err) => {
                debug!(error = %err, "stored tokens rejected, clearing session");
                self.clear();
                false
            }
        }
    }

    /// Exchange credentials for tokens and load the profile
    ///
    /// On failure the previous tokens and user are left exactly as they were.
    pub fn login(&self, request: &LoginRequest) -> TrackrResult<User> {
        let previous = self.snapshot();

        let result = (|| -> TrackrResult<User> {
            let outcome = AuthApi::new(&self.client).login(request)?;
            if let Some(tokens) = &outcome.tokens {
                self.client
                    .tokens()
                    .set_tokens(&tokens.access, tokens.refresh.as_deref())?;
            }
            match outcome.user {
                Some(user) => Ok(user),
                None => AuthApi::new(&self.client).me_with_new_tokens(),
            }
        })();

        match result {
            Ok(user) => {
                info!(user = %user.email, "logged in");
                *self.user.write() = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                self.restore(previous);
                Err(auth_failure(err, "Login failed"))
            }
        }
    }

    /// Create an account
    ///
    /// Returns the signed-in user when the backend issued tokens, or `None`
    /// when the new account still has to log in.
    pub fn register(&self, request: &RegisterRequest) -> TrackrResult<Option<User>> {
        let previous = self.snapshot();

        let result = (|| -> TrackrResult<Option<User>> {
            let outcome = AuthApi::new(&self.client).register(request)?;
            let Some(tokens) = outcome.tokens else {
                return Ok(None);
            };
            self.client
                .tokens()
                .set_tokens(&tokens.access, tokens.refresh.as_deref())?;
            match outcome.user {
                Some(user) => Ok(Some(user)),
                None => AuthApi::new(&self.client).me_with_new_tokens().map(Some),
            }
        })();

        match result {
            Ok(Some(user)) => {
                info!(user = %user.email, "registered and logged in");
                *self.user.write() = Some(user.clone());
                Ok(Some(user))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.restore(previous);
                Err(auth_failure(err, "Registration failed"))
            }
        }
    }

    /// Sign out; the backend call is best-effort, local state always clears
    pub fn logout(&self) {
        let tokens = self.client.tokens();
        if tokens.access_token().is_some() {
            let refresh = tokens.refresh_token();
            if let Err(err) = AuthApi::new(&self.client).logout(refresh.as_deref()) {
                debug!(error = %err, "backend logout failed, clearing local session anyway");
            }
        }
        self.clear();
    }

    /// Reload the profile; failures end the session silently
    pub fn refresh_user(&self) -> Option<User> {
        if self.client.tokens().access_token().is_none() {
            *self.user.write() = None;
            return None;
        }

        match AuthApi::new(&self.client).me() {
            Ok(user) => {
                *self.user.write() = Some(user.clone());
                Some(user)
            }
            Err(err) => {
                debug!(error = %err, "profile refresh failed");
                self.clear();
                None
            }
        }
    }

    /// Replace the cached profile, e.g. after a profile update
    pub fn set_user(&self, user: User) {
        *self.user.write() = Some(user);
    }

    /// Drop tokens and user together
    pub fn clear(&self) {
        if let Err(err) = self.client.tokens().clear() {
            warn!(error = %err, "failed to clear stored tokens");
        }
        *self.user.write() = None;
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    /// Whether tokens are stored, without asking the backend
    pub fn has_credentials(&self) -> bool {
        self.client.tokens().access_token().is_some()
    }

    /// Fail fast when no tokens are stored at all
    pub fn require_credentials(&self) -> TrackrResult<()> {
        if self.has_credentials() {
            Ok(())
        } else {
            Err(TrackrError::NotLoggedIn)
        }
    }

    fn snapshot(&self) -> (StoredTokens, Option<User>) {
        (self.client.tokens().snapshot(), self.current_user())
    }

    /// Put back tokens and user as they were before a failed exchange
    fn restore(&self, (tokens, user): (StoredTokens, Option<User>)) {
        if let Err(err) = self.client.tokens().restore(&tokens) {
            warn!(error = %err, "failed to restore previous tokens");
        }
        *self.user.write() = user;
    }
}

/// Turn a failed credential exchange into a user-facing auth error
///
/// The message is the backend's own when it sent one, else `fallback`;
/// it is never empty.
fn auth_failure(err: TrackrError, fallback: &str) -> TrackrError {
    match err {
        TrackrError::Api { message, .. }
        | TrackrError::Unauthorized(message)
        | TrackrError::Auth(message) => {
            let message = message.trim();
            if message.is_empty() {
                TrackrError::Auth(fallback.to_string())
            } else {
                TrackrError::Auth(message.to_string())
            }
        }
        TrackrError::SessionExpired => TrackrError::Auth(fallback.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_client;
    use crate::api::ApiRequest;
    use crate::storage::{MemoryTokenStore, TokenStore};
    use serde_json::{json, Value};

    fn user_json(email: &str) -> Value {
        json!({"id": 1, "email": email, "first_name": "Ada", "last_name": "Lovelace"})
    }

    fn session_with<F>(store: Arc<MemoryTokenStore>, handler: F) -> Session
    where
        F: Fn(&ApiRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        let (client, _) = mock_client(store, handler);
        Session::new(Arc::new(client))
    }

    #[test]
    fn test_login_stores_tokens_and_user() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/login/" => (200, json!({"access": "a1", "refresh": "r1"})),
            "/api/auth/me/" => (200, user_json("ada@example.com")),
            _ => (404, json!({})),
        });

        let user = session
            .login(&LoginRequest::new("ada@example.com", "hunter22"))
            .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert!(session.is_authenticated());
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_failed_login_leaves_state_unchanged() {
        let store = Arc::new(MemoryTokenStore::with_tokens("old-access", Some("old-refresh")));
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/me/" => (200, user_json("ada@example.com")),
            _ => (401, json!({"detail": "No active account found with the given credentials"})),
        });
        assert!(session.init());
        let before = session.current_user();

        let err = session
            .login(&LoginRequest::new("mallory@example.com", "wrong-password"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No active account found with the given credentials"
        );
        assert_eq!(session.current_user(), before);
        assert_eq!(store.access_token().as_deref(), Some("old-access"));
        assert_eq!(store.refresh_token().as_deref(), Some("old-refresh"));
    }

    #[test]
    fn test_failed_login_message_never_empty() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session_with(store.clone(), |_| (400, Value::String(String::new())));

        let err = session
            .login(&LoginRequest::new("ada@example.com", "hunter22"))
            .unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(!session.is_authenticated());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_login_with_rejected_new_tokens_keeps_previous_user() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a-old", Some("r-old")));
        let (client, log) = mock_client(store.clone(), |req| match req.path.as_str() {
            "/api/auth/login/" => (200, json!({"access": "a-new", "refresh": "r-new"})),
            "/api/auth/me/" if req.bearer.as_deref() == Some("a-old") => {
                (200, user_json("ada@example.com"))
            }
            _ => (401, json!({"detail": "Token is invalid or expired"})),
        });
        let session = Session::new(Arc::new(client));
        assert!(session.init());
        let before = session.current_user();

        let err = session
            .login(&LoginRequest::new("grace@example.com", "hunter22"))
            .unwrap_err();
        assert!(matches!(err, TrackrError::Auth(_)));
        assert_eq!(session.current_user(), before);
        assert_eq!(store.access_token().as_deref(), Some("a-old"));
        assert_eq!(store.refresh_token().as_deref(), Some("r-old"));
        assert_eq!(log.count_path("/api/auth/token/refresh/"), 0);
    }

    #[test]
    fn test_login_server_error_keeps_previous_user() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a-old", Some("r-old")));
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/me/" if req.bearer.as_deref() == Some("a-old") => {
                (200, user_json("ada@example.com"))
            }
            "/api/auth/login/" => (200, json!({"access": "a-new", "refresh": "r-new"})),
            _ => (500, json!({"detail": "boom"})),
        });
        assert!(session.init());
        let before = session.current_user();

        session
            .login(&LoginRequest::new("grace@example.com", "hunter22"))
            .unwrap_err();
        assert_eq!(session.current_user(), before);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_login_profile_failure_rolls_back_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/login/" => (200, json!({"access": "a1", "refresh": "r1"})),
            _ => (500, json!({"detail": "boom"})),
        });

        let err = session
            .login(&LoginRequest::new("ada@example.com", "hunter22"))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(store.snapshot().is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_expired_refresh_clears_user() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a1", Some("r1")));
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/me/" if req.bearer.as_deref() == Some("a1") => {
                (200, user_json("ada@example.com"))
            }
            _ => (401, json!({"detail": "Token is invalid or expired"})),
        });
        assert!(session.init());

        store.set_access_token("expired").unwrap();
        let err = session
            .client()
            .send_empty(ApiRequest::get("/api/expenses/"))
            .unwrap_err();

        assert!(matches!(err, TrackrError::SessionExpired));
        assert!(store.snapshot().is_empty());
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_init_with_rejected_tokens_clears() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a1", None));
        let session = session_with(store.clone(), |_| (401, json!({})));

        assert!(!session.init());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_init_without_tokens_skips_network() {
        let store = Arc::new(MemoryTokenStore::new());
        let (client, log) = mock_client(store, |_| (200, json!({})));
        let session = Session::new(Arc::new(client));

        assert!(!session.init());
        assert!(log.requests().is_empty());
    }

    #[test]
    fn test_logout_clears_even_when_backend_fails() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a1", Some("r1")));
        let session = session_with(store.clone(), |req| match req.path.as_str() {
            "/api/auth/me/" => (200, user_json("ada@example.com")),
            _ => (500, json!({})),
        });
        assert!(session.init());

        session.logout();
        assert!(!session.is_authenticated());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_register_without_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session_with(store.clone(), |_| {
            (201, json!({"id": 9, "email": "new@example.com"}))
        });

        let request = RegisterRequest {
            email: "new@example.com".into(),
            username: None,
            first_name: None,
            last_name: None,
            password: zeroize::Zeroizing::new("longenough".into()),
            password_confirm: zeroize::Zeroizing::new("longenough".into()),
        };
        assert_eq!(session.register(&request).unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_register_field_error_message() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session_with(store, |_| {
            (400, json!({"email": ["user with this email already exists."]}))
        });

        let request = RegisterRequest {
            email: "ada@example.com".into(),
            username: None,
            first_name: None,
            last_name: None,
            password: zeroize::Zeroizing::new("longenough".into()),
            password_confirm: zeroize::Zeroizing::new("longenough".into()),
        };
        let err = session.register(&request).unwrap_err();
        assert_eq!(err.to_string(), "email: user with this email already exists.");
    }

    #[test]
    fn test_refresh_user_failure_is_silent() {
        let store = Arc::new(MemoryTokenStore::with_tokens("a1", None));
        let session = session_with(store.clone(), |_| (503, json!({})));

        assert!(session.refresh_user().is_none());
        assert!(!session.is_authenticated());
        assert!(store.snapshot().is_empty());
    }
}
