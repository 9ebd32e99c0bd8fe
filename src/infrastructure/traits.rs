//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};

/// Status and body of an HTTP exchange, before any status interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 4xx and 5xx statuses.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status)
    }
}

/// HTTP abstraction for testability.
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body and block until the full response body is read.
    ///
    /// Only connection-level failures are errors (`ApplicationError::Transport`);
    /// every HTTP status, 4xx/5xx included, comes back as an `HttpResponse`.
    fn post_json(&self, url: &str, body: String) -> ApplicationResult<HttpResponse>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    /// Build the client. `None` keeps reqwest's default timeout.
    pub fn new(timeout: Option<Duration>) -> ApplicationResult<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            ApplicationError::transport("<client>", format!("cannot build HTTP client: {e}"))
        })?;
        Ok(Self { http })
    }

    /// Wrap a preconfigured client (proxy, TLS or header settings).
    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    fn post_json(&self, url: &str, body: String) -> ApplicationResult<HttpResponse> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| ApplicationError::transport(url, describe_reqwest_error(&e)))?;

        let status = response.status().as_u16();
        debug!(status, "response headers received");

        let body = response.text().map_err(|e| {
            ApplicationError::transport(url, format!("cannot read response body: {e}"))
        })?;

        Ok(HttpResponse { status, body })
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}
