//! Per-request and per-run result types.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::format::{format_body, format_bytes, format_duration};
use crate::transport::HttpResponse;

/// Display-ready summary of one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub status_code: u16,

    /// 2xx status.
    pub success: bool,

    /// Status line, e.g. `200 OK`.
    pub status: String,

    /// Human-formatted Content-Length, e.g. `1.50KB`.
    pub content_length: String,

    /// Human-formatted elapsed time, e.g. `120ms`.
    pub duration: String,

    /// Body formatted for display.
    pub body: String,
}

impl ExecutionResult {
    pub fn from_response(response: &HttpResponse, pretty: bool) -> Self {
        Self {
            status_code: response.status,
            success: response.is_success(),
            status: response.status_line(),
            content_length: format_bytes(response.content_length),
            duration: format_duration(response.duration),
            body: format_body(response.content_type(), &response.body, pretty),
        }
    }
}

/// How a playbook run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every request was attempted.
    Completed,
    /// A request with `exitOnError` failed and stopped the run.
    Aborted { index: usize, name: String },
}

/// What happened to one request during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub index: usize,
    pub name: String,
    pub method: String,
    /// URL as dispatched, after template rendering.
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Extraction produced at least one value.
    pub variables_changed: bool,
}

/// Result of a playbook run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub requests: Vec<RequestOutcome>,
    pub variables: BTreeMap<String, String>,
}

impl RunSummary {
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Aborted { .. })
    }

    /// Names of requests that reached the transport and got a response.
    pub fn responded(&self) -> impl Iterator<Item = &str> {
        self.requests
            .iter()
            .filter(|r| r.status_code.is_some())
            .map(|r| r.name.as_str())
    }
}
