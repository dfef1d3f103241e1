//! Request/response types and the wire transport
//!
//! `ApiClient` builds `ApiRequest`s and hands them to a `Transport`. The
//! production transport is a blocking reqwest client; tests plug in a
//! scripted one.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::TrackrResult;

/// Called with the upload percentage (0-100) as the body is sent
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A file sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    /// Form field name the backend reads the file from
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    /// Extra text fields sent alongside the file
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    File(FileUpload),
}

/// A request as seen by the interceptors
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API base URL, e.g. `/api/expenses/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Bearer token attached by the request interceptor
    pub bearer: Option<String>,
    /// Whether the request interceptor should attach the access token
    pub authenticate: bool,
    /// Whether a 401 may trigger the refresh-and-replay path
    pub allow_refresh: bool,
    /// Set once the request has been replayed after a token refresh
    pub retried: bool,
    pub progress: Option<ProgressCallback>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
            authenticate: true,
            allow_refresh: true,
            retried: false,
            progress: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_file(mut self, upload: FileUpload) -> Self {
        self.body = RequestBody::File(upload);
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Credential exchanges (login, register, refresh) answer 401 for bad
    /// credentials; those must reach the caller instead of the refresh path.
    pub fn without_refresh(mut self) -> Self {
        self.allow_refresh = false;
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.authenticate = false;
        self
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("allow_refresh", &self.allow_refresh)
            .field("retried", &self.retried)
            .finish()
    }
}

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns whatever the server answered
///
/// Implementations report non-2xx statuses as normal responses; only
/// failures to get any response at all are errors.
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, request: &ApiRequest) -> TrackrResult<ApiResponse>;
}

/// Blocking reqwest transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> TrackrResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trackr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, url: &str, request: &ApiRequest) -> TrackrResult<ApiResponse> {
        let mut builder = self.client.request(request.method.into(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File(upload) => {
                let length = upload.bytes.len() as u64;
                let reader = ProgressReader::new(upload.bytes.clone(), request.progress.clone());
                let part = Part::reader_with_length(reader, length)
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.mime)?;

                let mut form = Form::new().part(upload.field.clone(), part);
                for (name, value) in &upload.fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder.multipart(form)
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(ApiResponse { status, body })
    }
}

/// Reader over an in-memory body that reports percentage progress
///
/// Percentages are reported only when they increase, so callers see a
/// monotonic sequence ending at 100.
pub struct ProgressReader {
    inner: Cursor<Vec<u8>>,
    total: u64,
    last_reported: Option<u8>,
    callback: Option<ProgressCallback>,
}

impl ProgressReader {
    pub fn new(bytes: Vec<u8>, callback: Option<ProgressCallback>) -> Self {
        let total = bytes.len() as u64;
        Self {
            inner: Cursor::new(bytes),
            total,
            last_reported: None,
            callback,
        }
    }

    fn report(&mut self) {
        let Some(callback) = &self.callback else {
            return;
        };

        let percent = if self.total == 0 {
            100
        } else {
            (self.inner.position().min(self.total) * 100 / self.total) as u8
        };

        if self.last_reported.map_or(true, |last| percent > last) {
            self.last_reported = Some(percent);
            callback(percent);
        }
    }
}

impl Read for ProgressReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.report();
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_callback() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |pct| sink.lock().push(pct));
        (callback, seen)
    }

    #[test]
    fn test_progress_is_monotonic_and_reaches_100() {
        let (callback, seen) = recording_callback();
        let mut reader = ProgressReader::new(vec![7u8; 1000], Some(callback));

        let mut buf = [0u8; 64];
        while reader.read(&mut buf).unwrap() > 0 {}

        let seen = seen.lock();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_progress_empty_body() {
        let (callback, seen) = recording_callback();
        let mut reader = ProgressReader::new(Vec::new(), Some(callback));

        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(*seen.lock(), vec![100]);
    }

    #[test]
    fn test_reader_passes_bytes_through() {
        let mut reader = ProgressReader::new(b"date,amount\n".to_vec(), None);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "date,amount\n");
    }

    #[test]
    fn test_debug_redacts_bearer() {
        let mut request = ApiRequest::get("/api/expenses/");
        request.bearer = Some("secret-token".into());
        let printed = format!("{:?}", request);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }
}
