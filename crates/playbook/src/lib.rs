//! httpcli playbook engine
//!
//! Runs an ordered list of HTTP requests described in a YAML playbook,
//! extracting values from responses and rendering them into the requests
//! that follow.
//!
//! This crate provides:
//! - Playbook model, loading and validation
//! - Template reconciliation with Jinja2-compatible syntax
//! - jq path queries for variable extraction
//! - A reqwest transport that never follows redirects
//! - The sequential runner and console reporting

pub mod config;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod format;
pub mod playbook;
pub mod query;
pub mod report;
pub mod result;
pub mod runner;
pub mod template;
pub mod transport;
pub mod variables;

pub use config::{ClientConfig, Settings};
pub use error::{PlaybookError, PlaybookResult};
pub use executor::{DisplayOptions, RequestExecutor};
pub use extractor::ResponseExtractor;
pub use playbook::{Playbook, PlaybookFile, RequestSpec, ValidationMode};
pub use report::{ConsoleReporter, Reporter};
pub use result::{ExecutionResult, RunOutcome, RunSummary};
pub use runner::PlaybookRunner;
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use variables::VariableStore;
