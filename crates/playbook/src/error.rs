//! Playbook error types.

use thiserror::Error;

/// Errors that can occur while loading or running a playbook.
#[derive(Debug, Error)]
pub enum PlaybookError {
    /// Playbook file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// Playbook contents did not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// One or more requests failed validation in strict mode.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Template rendering or re-parsing failed.
    #[error("Template error: {0}")]
    Template(String),

    /// The request could not be completed by the transport.
    #[error("{0}")]
    Transport(String),

    /// Method outside GET, PUT, POST, DELETE, HEAD.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Header entry without a `Key: Value` shape.
    #[error("Invalid header '{0}': expected 'Key: Value'")]
    InvalidHeader(String),

    /// URL that does not parse or lacks a scheme or host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl PlaybookError {
    /// Returns true for failures scoped to a single request.
    ///
    /// These are reported inline and gated by the request's `exitOnError`
    /// flag. Everything else stops the run.
    pub fn is_request_scoped(&self) -> bool {
        matches!(
            self,
            PlaybookError::Transport(_)
                | PlaybookError::UnsupportedMethod(_)
                | PlaybookError::InvalidHeader(_)
                | PlaybookError::InvalidUrl(_)
        )
    }
}

/// Result type alias using PlaybookError.
pub type PlaybookResult<T> = Result<T, PlaybookError>;

impl From<std::io::Error> for PlaybookError {
    fn from(e: std::io::Error) -> Self {
        PlaybookError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for PlaybookError {
    fn from(e: serde_yaml::Error) -> Self {
        PlaybookError::Parse(e.to_string())
    }
}

impl From<minijinja::Error> for PlaybookError {
    fn from(e: minijinja::Error) -> Self {
        PlaybookError::Template(e.to_string())
    }
}

impl From<reqwest::Error> for PlaybookError {
    fn from(e: reqwest::Error) -> Self {
        PlaybookError::Transport(format!("error occurred performing request - {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaybookError::UnsupportedMethod("PATCH".to_string());
        assert_eq!(err.to_string(), "Unsupported method: PATCH");

        let err = PlaybookError::InvalidHeader("Accept".to_string());
        assert_eq!(err.to_string(), "Invalid header 'Accept': expected 'Key: Value'");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlaybookError = io_err.into();
        assert!(matches!(err, PlaybookError::Io(_)));
    }

    #[test]
    fn test_request_scoped() {
        assert!(PlaybookError::Transport("x".into()).is_request_scoped());
        assert!(PlaybookError::InvalidHeader("x".into()).is_request_scoped());
        assert!(!PlaybookError::Template("x".into()).is_request_scoped());
        assert!(!PlaybookError::Parse("x".into()).is_request_scoped());
    }
}
