//! Scripted transport for unit tests

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::client::ApiClient;
use super::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
use crate::error::TrackrResult;
use crate::storage::TokenStore;

type Handler = Box<dyn Fn(&ApiRequest) -> (u16, Value) + Send + Sync>;

/// What the transport saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub retried: bool,
    pub body: RequestBody,
}

impl RecordedRequest {
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().clone()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.0.lock().iter().filter(|r| r.path == path).count()
    }

    pub fn last(&self) -> Option<RecordedRequest> {
        self.0.lock().last().cloned()
    }
}

/// Answers each request with whatever the handler returns
///
/// A `Value::String` body is sent raw (useful for non-JSON error pages);
/// `Value::Null` becomes an empty body.
pub struct MockTransport {
    handler: Handler,
    log: RequestLog,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            log: RequestLog::default(),
        }
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, url: &str, request: &ApiRequest) -> TrackrResult<ApiResponse> {
        self.log.0.lock().push(RecordedRequest {
            method: request.method,
            url: url.to_string(),
            path: request.path.clone(),
            query: request.query.clone(),
            bearer: request.bearer.clone(),
            retried: request.retried,
            body: request.body.clone(),
        });

        let (status, value) = (self.handler)(request);
        let body = match value {
            Value::Null => String::new(),
            Value::String(raw) => raw,
            other => other.to_string(),
        };
        Ok(ApiResponse { status, body })
    }
}

/// A client over a `MockTransport`, plus the transport's request log
pub fn mock_client<F>(tokens: Arc<dyn TokenStore>, handler: F) -> (ApiClient, RequestLog)
where
    F: Fn(&ApiRequest) -> (u16, Value) + Send + Sync + 'static,
{
    let transport = MockTransport::new(handler);
    let log = transport.log();
    let client = ApiClient::new("http://trackr.test", Box::new(transport), tokens);
    (client, log)
}
