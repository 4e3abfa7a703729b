//! Playbook model, loading and validation.

mod parser;
mod types;
mod validate;

pub use parser::{parse_playbook, PlaybookFile};
pub use types::{normalize_url, HttpMethod, Playbook, RequestSpec};
pub use validate::{describe_report, is_valid_url, RequestKey, ValidationMode, ValidationReport};
