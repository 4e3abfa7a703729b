//! Request validation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::playbook::types::{HttpMethod, Playbook, RequestSpec};

/// How validation findings affect a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Report findings and keep going.
    #[default]
    Warn,
    /// Refuse to run a playbook with findings.
    Strict,
}

/// Identifies a request in a validation report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestKey {
    /// Zero-based position, used for unnamed requests.
    Index(usize),
    Name(String),
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKey::Index(i) => write!(f, "request #{}", i),
            RequestKey::Name(name) => f.write_str(name),
        }
    }
}

/// Validation findings keyed by request.
pub type ValidationReport = BTreeMap<RequestKey, Vec<String>>;

/// Check a URL has a scheme and a non-empty host.
pub fn is_valid_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

impl RequestSpec {
    /// Messages for every problem found in this request.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("please provide a name for your request".to_string());
        }
        if HttpMethod::from_str(&self.method).is_err() {
            errors.push("please provide a valid method [GET, PUT, POST, DELETE, HEAD]".to_string());
        }
        if !is_valid_url(&self.url) {
            errors.push("please provide a valid url".to_string());
        }
        errors
    }
}

impl Playbook {
    /// Validate all requests; only requests with findings appear.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (i, request) in self.requests.iter().enumerate() {
            let errors = request.validate();
            if errors.is_empty() {
                continue;
            }
            let key = if request.name.is_empty() {
                RequestKey::Index(i)
            } else {
                RequestKey::Name(request.name.clone())
            };
            report.entry(key).or_default().extend(errors);
        }
        report
    }
}

/// Render a report as one line per request.
pub fn describe_report(report: &ValidationReport) -> String {
    report
        .iter()
        .map(|(key, messages)| format!("{}: {}", key, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
