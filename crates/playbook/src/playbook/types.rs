//! Playbook type definitions.
//!
//! These types map the playbook YAML format:
//!
//! ```yaml
//! name: user flow
//! variables:
//!   host: localhost:8080
//! requests:
//!   - name: login
//!     method: POST
//!     url: http://{{ host }}/login
//!     headers: ["Content-Type: application/json"]
//!     data: '{"user": "admin"}'
//!     parse:
//!       token: .token
//!     exitOnError: true
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PlaybookError;

/// Methods a request may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)] // HTTP methods are conventionally uppercase
pub enum HttpMethod {
    GET,
    PUT,
    POST,
    DELETE,
    HEAD,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::GET,
        HttpMethod::PUT,
        HttpMethod::POST,
        HttpMethod::DELETE,
        HttpMethod::HEAD,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::PUT => "PUT",
            HttpMethod::POST => "POST",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
        }
    }

    /// Whether the request's `data` is sent as the body.
    ///
    /// GET and HEAD never carry a body, even when `data` is set.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::PUT | HttpMethod::POST | HttpMethod::DELETE)
    }
}

impl FromStr for HttpMethod {
    type Err = PlaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| PlaybookError::UnsupportedMethod(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::HEAD => reqwest::Method::HEAD,
        }
    }
}

/// Parsed playbook document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Playbook {
    /// Display label.
    #[serde(default)]
    pub name: String,

    /// Initial variable bindings.
    #[serde(default, deserialize_with = "scalar_map")]
    pub variables: BTreeMap<String, String>,

    /// Requests, executed in file order.
    #[serde(default)]
    pub requests: Vec<RequestSpec>,
}

/// A single request in a playbook.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default)]
    pub name: String,

    /// Method as written; parsed case-insensitively at dispatch time.
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub url: String,

    /// `Key: Value` entries.
    #[serde(default)]
    pub headers: Vec<String>,

    /// Raw request body. Empty means an empty body for PUT/POST/DELETE.
    #[serde(default)]
    pub data: String,

    /// Variable name to query expression.
    #[serde(default, rename = "parse", alias = "extract")]
    pub extract: BTreeMap<String, String>,

    /// Stop the run when this request fails at the transport level.
    #[serde(default, rename = "exitOnError", alias = "abortOnError")]
    pub abort_on_error: bool,
}

impl RequestSpec {
    /// Label used in reports: the name, or the index when unnamed.
    pub fn label(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("request #{}", index)
        } else {
            self.name.clone()
        }
    }
}

/// Prepend `http://` to URLs written without a scheme.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Accept any YAML scalar as a variable value.
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_yaml::Value>> = Option::deserialize(deserializer)?;
    let mut variables = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Null => String::new(),
            other => serde_yaml::to_string(&other)
                .map_err(serde::de::Error::custom)?
                .trim()
                .to_string(),
        };
        variables.insert(key, value);
    }
    Ok(variables)
}
