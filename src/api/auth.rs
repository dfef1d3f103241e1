//! Authentication endpoints

use serde_json::{json, Value};

use super::client::ApiClient;
use super::transport::ApiRequest;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{AuthTokens, LoginRequest, RegisterRequest, User};

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const REGISTER_PATH: &str = "/api/auth/register/";
pub const LOGOUT_PATH: &str = "/api/auth/logout/";
pub const ME_PATH: &str = "/api/auth/me/";
pub const REFRESH_PATH: &str = "/api/auth/token/refresh/";

/// Tokens and profile returned by a credential exchange
///
/// Either may be missing: some backends register without logging in,
/// and most do not embed the user in the login response.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub tokens: Option<AuthTokens>,
    pub user: Option<User>,
}

impl AuthOutcome {
    fn from_response(value: &Value) -> Self {
        let user = value
            .get("user")
            .and_then(|user| serde_json::from_value(user.clone()).ok());
        Self {
            tokens: AuthTokens::from_response(value),
            user,
        }
    }
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn login(&self, request: &LoginRequest) -> TrackrResult<AuthOutcome> {
        request.validate()?;
        let body: Value = self.client.send_json(
            ApiRequest::post(LOGIN_PATH)
                .with_json(request.to_payload(self.client.revision()))
                .without_auth()
                .without_refresh(),
        )?;

        let outcome = AuthOutcome::from_response(&body);
        if outcome.tokens.is_none() {
            return Err(TrackrError::Auth(
                "Login succeeded but the server returned no access token".into(),
            ));
        }
        Ok(outcome)
    }

    pub fn register(&self, request: &RegisterRequest) -> TrackrResult<AuthOutcome> {
        let revision = self.client.revision();
        request.validate(revision)?;
        let body: Value = self.client.send_json(
            ApiRequest::post(REGISTER_PATH)
                .with_json(request.to_payload(revision))
                .without_auth()
                .without_refresh(),
        )?;
        Ok(AuthOutcome::from_response(&body))
    }

    /// Blacklist the refresh token server-side
    pub fn logout(&self, refresh: Option<&str>) -> TrackrResult<()> {
        let body = match refresh {
            Some(token) => json!({ "refresh": token }),
            None => json!({}),
        };
        self.client
            .send_empty(ApiRequest::post(LOGOUT_PATH).with_json(body).without_refresh())
    }

    pub fn me(&self) -> TrackrResult<User> {
        self.client.send_json(ApiRequest::get(ME_PATH))
    }

    /// Load the profile for tokens that were just issued
    ///
    /// A 401 here means the new tokens are unusable, so no refresh is tried
    /// and no session-expired hook fires.
    pub fn me_with_new_tokens(&self) -> TrackrResult<User> {
        self.client.send_json(ApiRequest::get(ME_PATH).without_refresh())
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Never goes through the refresh path itself.
    pub fn refresh(&self, refresh: &str) -> TrackrResult<AuthTokens> {
        let body: Value = self.client.send_json(
            ApiRequest::post(REFRESH_PATH)
                .with_json(json!({ "refresh": refresh }))
                .without_auth()
                .without_refresh(),
        )?;

        AuthTokens::from_response(&body).ok_or_else(|| {
            TrackrError::Auth("Token refresh returned no access token".into())
        })
    }
}
