//! Playbook YAML loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PlaybookError, PlaybookResult};
use crate::playbook::types::{normalize_url, Playbook};

/// Parse YAML source into a Playbook and normalize request URLs.
pub fn parse_playbook(source: &str) -> PlaybookResult<Playbook> {
    let mut playbook: Playbook = serde_yaml::from_str(source).map_err(|e| {
        PlaybookError::Parse(format!("failed to convert file to expected format - {}", e))
    })?;

    for request in &mut playbook.requests {
        request.url = normalize_url(&request.url);
    }

    Ok(playbook)
}

/// A playbook loaded from disk together with its raw source.
///
/// The source is read once and kept so later template passes render the
/// in-memory copy, never the file.
#[derive(Debug, Clone)]
pub struct PlaybookFile {
    path: PathBuf,
    source: String,
    playbook: Playbook,
}

impl PlaybookFile {
    /// Read and parse a playbook file.
    pub fn load(path: impl AsRef<Path>) -> PlaybookResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            PlaybookError::Io(format!("failed to read file ({}) - {}", path.display(), e))
        })?;
        let source = String::from_utf8(bytes).map_err(|e| {
            PlaybookError::Parse(format!("file ({}) is not valid UTF-8 - {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = source.len(), "Loaded playbook file");

        Self::from_source(path, source)
    }

    /// Parse a playbook from source already in memory.
    pub fn from_source(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> PlaybookResult<Self> {
        let source = source.into();
        let playbook = parse_playbook(&source)?;
        Ok(Self {
            path: path.into(),
            source,
            playbook,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw source as read from disk.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn playbook(&self) -> &Playbook {
        &self.playbook
    }
}
