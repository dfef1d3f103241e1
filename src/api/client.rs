//! Shared HTTP client with auth interceptors
//!
//! Every API module goes through one `ApiClient`. On the way out the
//! request interceptor attaches the stored access token. On the way back a
//! 401 triggers at most one refresh-token exchange and one replay of the
//! original request; if the exchange is impossible or fails, the tokens are
//! cleared and the session-expired hooks fire.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::auth::AuthApi;
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::{SchemaRevision, Settings};
use crate::error::{extract_error_message, TrackrError, TrackrResult};
use crate::storage::TokenStore;

type SessionHook = Box<dyn Fn() + Send + Sync>;

pub struct ApiClient {
    base_url: String,
    revision: SchemaRevision,
    transport: Box<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    session_hooks: RwLock<Vec<SessionHook>>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Box<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            revision: SchemaRevision::default(),
            transport,
            tokens,
            session_hooks: RwLock::new(Vec::new()),
        }
    }

    /// Build a client talking to the configured backend over reqwest
    pub fn from_settings(settings: &Settings, tokens: Arc<dyn TokenStore>) -> TrackrResult<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(settings.request_timeout_secs))?;
        Ok(Self::new(settings.api_base_url.clone(), Box::new(transport), tokens)
            .with_revision(settings.schema_revision))
    }

    pub fn with_revision(mut self, revision: SchemaRevision) -> Self {
        self.revision = revision;
        self
    }

    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// Register a callback fired whenever the client drops the session
    /// because the tokens could not be refreshed
    pub fn on_session_expired<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.session_hooks.write().push(Box::new(hook));
    }

    /// Send a request through both interceptors
    ///
    /// Returns the response for 2xx statuses and an error otherwise.
    pub fn execute(&self, mut request: ApiRequest) -> TrackrResult<ApiResponse> {
        let response = self.dispatch(&mut request)?;

        if response.status != 401 || !request.allow_refresh {
            return into_result(response);
        }

        if request.retried {
            return Err(TrackrError::Unauthorized(error_message(&response)));
        }

        match self.refresh_access_token() {
            Ok(()) => {
                request.retried = true;
                let replayed = self.dispatch(&mut request)?;
                if replayed.status == 401 {
                    return Err(TrackrError::Unauthorized(error_message(&replayed)));
                }
                into_result(replayed)
            }
            Err(err) => {
                warn!(path = %request.path, error = %err, "token refresh failed, ending session");
                self.expire_session();
                Err(TrackrError::SessionExpired)
            }
        }
    }

    /// Execute and decode a JSON body
    pub fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> TrackrResult<T> {
        let path = request.path.clone();
        let response = self.execute(request)?;
        serde_json::from_str(&response.body).map_err(|e| {
            TrackrError::Json(format!("Unexpected response from {}: {}", path, e))
        })
    }

    /// Execute and ignore the body (e.g. 204 No Content)
    pub fn send_empty(&self, request: ApiRequest) -> TrackrResult<()> {
        self.execute(request).map(|_| ())
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> TrackrResult<T> {
        self.send_json(ApiRequest::get(path).with_query(query))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request interceptor: attach the current access token
    fn dispatch(&self, request: &mut ApiRequest) -> TrackrResult<ApiResponse> {
        request.bearer = if request.authenticate {
            self.tokens.access_token()
        } else {
            None
        };

        debug!(
            method = ?request.method,
            path = %request.path,
            retried = request.retried,
            "sending request"
        );

        let response = self.transport.send(&self.url(&request.path), request)?;
        debug!(status = response.status, path = %request.path, "received response");
        Ok(response)
    }

    fn refresh_access_token(&self) -> TrackrResult<()> {
        let refresh = self
            .tokens
            .refresh_token()
            .ok_or(TrackrError::SessionExpired)?;

        let tokens = AuthApi::new(self).refresh(&refresh)?;
        self.tokens
            .set_tokens(&tokens.access, tokens.refresh.as_deref())?;
        debug!("access token refreshed");
        Ok(())
    }

    fn expire_session(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "failed to clear stored tokens");
        }
        for hook in self.session_hooks.read().iter() {
            hook();
        }
    }
}

fn into_result(response: ApiResponse) -> TrackrResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(TrackrError::Api {
            status: response.status,
            message: error_message(&response),
        })
    }
}

fn error_message(response: &ApiResponse) -> String {
    extract_error_message(&response.body).unwrap_or_else(|| match response.status {
        400 => "The request was rejected by the server".to_string(),
        401 => "Authentication credentials were not accepted".to_string(),
        403 => "You do not have permission to do that".to_string(),
        404 => "The requested resource was not found".to_string(),
        status if status >= 500 => format!("Server error ({})", status),
        status => format!("Request failed with status {}", status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{mock_client, MockTransport};
    use crate::storage::MemoryTokenStore;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REFRESH: &str = "/api/auth/token/refresh/";

    #[test]
    fn test_attaches_bearer_token() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("access-1", Some("refresh-1")));
        let (client, log) = mock_client(tokens, |_| (200, json!([])));

        let _: Vec<Value> = client.get_json("/api/categories/", Vec::new()).unwrap();

        let requests = log.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].bearer.as_deref(), Some("access-1"));
    }

    #[test]
    fn test_no_bearer_when_logged_out() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let (client, log) = mock_client(tokens, |_| (200, json!({})));

        let _: Value = client.get_json("/api/analytics/summary/", Vec::new()).unwrap();
        assert!(log.requests()[0].bearer.is_none());
    }

    #[test]
    fn test_401_refreshes_once_and_replays() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("stale", Some("refresh-1")));
        let (client, log) = mock_client(tokens.clone(), |req| {
            if req.path == REFRESH {
                return (200, json!({"access": "fresh"}));
            }
            match req.bearer.as_deref() {
                Some("fresh") => (200, json!([{"id": 1}])),
                _ => (401, json!({"detail": "Token is invalid or expired"})),
            }
        });

        let body: Vec<Value> = client.get_json("/api/expenses/", Vec::new()).unwrap();
        assert_eq!(body.len(), 1);

        let requests = log.requests();
        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/api/expenses/", REFRESH, "/api/expenses/"]);
        assert!(!requests[0].retried);
        assert!(requests[2].retried);
        assert_eq!(requests[2].bearer.as_deref(), Some("fresh"));

        // rotated refresh token not returned: the old one is kept
        assert_eq!(tokens.access_token().as_deref(), Some("fresh"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_persistent_401_never_loops() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("stale", Some("refresh-1")));
        let (client, log) = mock_client(tokens.clone(), |req| {
            if req.path == REFRESH {
                (200, json!({"access": "fresh", "refresh": "refresh-2"}))
            } else {
                (401, json!({"detail": "Still no"}))
            }
        });

        let err = client
            .send_empty(ApiRequest::get("/api/expenses/"))
            .unwrap_err();
        assert!(matches!(err, TrackrError::Unauthorized(ref msg) if msg == "Still no"));

        assert_eq!(log.count_path(REFRESH), 1);
        assert_eq!(log.count_path("/api/expenses/"), 2);
        assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-2"));
    }

    #[test]
    fn test_missing_refresh_token_expires_session() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("stale", None));
        let (client, log) = mock_client(tokens.clone(), |_| (401, json!({})));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        client.on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = client
            .send_empty(ApiRequest::get("/api/budgets/"))
            .unwrap_err();
        assert!(matches!(err, TrackrError::SessionExpired));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(tokens.snapshot().is_empty());
        assert_eq!(log.count_path(REFRESH), 0);
    }

    #[test]
    fn test_failed_refresh_clears_tokens() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("stale", Some("revoked")));
        let (client, log) = mock_client(tokens.clone(), |req| {
            if req.path == REFRESH {
                (401, json!({"detail": "Token is blacklisted"}))
            } else {
                (401, json!({"detail": "expired"}))
            }
        });

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        client.on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = client
            .send_empty(ApiRequest::get("/api/expenses/"))
            .unwrap_err();
        assert!(matches!(err, TrackrError::SessionExpired));
        assert!(tokens.snapshot().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // the refresh call itself never triggers another refresh
        assert_eq!(log.count_path(REFRESH), 1);
        assert_eq!(log.count_path("/api/expenses/"), 1);
    }

    #[test]
    fn test_refresh_call_sends_no_bearer() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("stale", Some("refresh-1")));
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&bodies);
        let transport = MockTransport::new(move |req| {
            if req.path == REFRESH {
                if let crate::api::RequestBody::Json(body) = &req.body {
                    seen.lock().push(body.clone());
                }
                (200, json!({"access": "fresh"}))
            } else if req.bearer.as_deref() == Some("fresh") {
                (204, Value::Null)
            } else {
                (401, json!({}))
            }
        });
        let log = transport.log();
        let client = ApiClient::new("http://test", Box::new(transport), tokens);

        client
            .send_empty(ApiRequest::delete("/api/expenses/3/"))
            .unwrap();

        let refresh_request = log
            .requests()
            .into_iter()
            .find(|r| r.path == REFRESH)
            .unwrap();
        assert!(refresh_request.bearer.is_none());
        assert_eq!(bodies.lock()[0], json!({"refresh": "refresh-1"}));
    }

    #[test]
    fn test_credential_exchange_401_is_returned_as_is() {
        let tokens = Arc::new(MemoryTokenStore::with_tokens("a", Some("r")));
        let (client, log) = mock_client(tokens.clone(), |_| {
            (401, json!({"detail": "No active account found with the given credentials"}))
        });

        let err = client
            .send_empty(ApiRequest::post("/api/auth/login/").without_refresh())
            .unwrap_err();
        match err {
            TrackrError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "No active account found with the given credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(log.count_path(REFRESH), 0);
        assert_eq!(tokens.access_token().as_deref(), Some("a"));
    }

    #[test]
    fn test_error_message_fallbacks() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let (client, _) = mock_client(tokens, |req| match req.path.as_str() {
            "/bad/" => (400, json!({"amount": ["A valid number is required."]})),
            _ => (502, Value::String("<html>Bad gateway</html>".into())),
        });

        let err = client.send_empty(ApiRequest::get("/bad/")).unwrap_err();
        assert_eq!(err.to_string(), "amount: A valid number is required.");

        let err = client.send_empty(ApiRequest::get("/gateway/")).unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_base_url_joining() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let transport = MockTransport::new(|_| (200, json!({})));
        let log = transport.log();
        let client = ApiClient::new("http://api.test/", Box::new(transport), tokens);

        client.send_empty(ApiRequest::get("/api/auth/me/")).unwrap();
        assert_eq!(log.requests()[0].url, "http://api.test/api/auth/me/");
    }
}
