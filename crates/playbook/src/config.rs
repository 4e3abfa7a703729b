//! Client configuration.

use std::time::Duration;

use crate::executor::DisplayOptions;
use crate::playbook::ValidationMode;

/// Settings read from the environment.
///
/// - `HTTPCLI_TIMEOUT_SECS`: per-request timeout (default: none)
/// - `HTTPCLI_STRICT`: make playbook validation blocking (default: false)
/// - `HTTPCLI_USER_AGENT`: User-Agent header (default: `httpcli/<version>`)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Transport timeout; `None` leaves the client default.
    pub timeout: Option<Duration>,

    /// Refuse to run playbooks that fail validation.
    pub strict: bool,

    pub user_agent: String,
}

impl Settings {
    /// Load settings from environment variables, reading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout = lookup("HTTPCLI_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let strict = lookup("HTTPCLI_STRICT")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let user_agent = lookup("HTTPCLI_USER_AGENT").unwrap_or_else(default_user_agent);

        Self {
            timeout,
            strict,
            user_agent,
        }
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Warn
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: None,
            strict: false,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("httpcli/{}", env!("CARGO_PKG_VERSION"))
}

/// Per-invocation flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    /// `Key: Value` headers added to single requests.
    pub headers: Vec<String>,

    /// Pretty print bodies based on Content-Type.
    pub pretty: bool,

    /// Print response status line and headers.
    pub include_headers: bool,

    /// Print the outgoing request.
    pub verbose: bool,
}

impl ClientConfig {
    pub fn display(&self) -> DisplayOptions {
        DisplayOptions {
            verbose: self.verbose,
            include_headers: self.include_headers,
        }
    }
}
