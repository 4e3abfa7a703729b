//! HTTP transport abstraction.
//!
//! The engine talks to the network only through [`Transport`], so runs can be
//! driven against a scripted transport in tests.

mod client;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::PlaybookError;
use crate::playbook::HttpMethod;

pub use client::ReqwestTransport;

/// A fully shaped request ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// `None` for GET/HEAD; `Some("")` is an explicit empty body.
    pub body: Option<String>,
}

/// Response as returned by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. `OK`.
    pub reason: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub version: String,
    pub headers: Vec<(String, String)>,
    /// Value of the Content-Length header, when present.
    pub content_length: Option<u64>,
    /// Time until the response head arrived.
    pub duration: Duration,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Status code and reason, e.g. `404 Not Found`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    /// 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }
}

/// Sends requests over the wire.
///
/// Implementations must not follow redirects and must not retry; every
/// failure is reported as [`PlaybookError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, PlaybookError>;
}
