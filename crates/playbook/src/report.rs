//! Console reporting for playbook runs.

use crossterm::style::Stylize;

use crate::error::PlaybookError;
use crate::playbook::{Playbook, RequestSpec, ValidationReport};
use crate::result::ExecutionResult;

const END_OF_REQUEST: &str = "##### END OF REQUEST #####";

/// Receives progress events from a run.
pub trait Reporter: Send + Sync {
    fn playbook_started(&self, playbook: &Playbook);

    fn validation_findings(&self, report: &ValidationReport);

    fn request_started(&self, index: usize, request: &RequestSpec);

    /// Transport-class failure for a request.
    fn request_failed(&self, index: usize, request: &RequestSpec, error: &PlaybookError);

    fn response_received(&self, index: usize, request: &RequestSpec, result: &ExecutionResult);

    fn run_aborted(&self, index: usize, request: &RequestSpec);
}

/// Colored console output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    /// Print the formatted body after each response.
    pub show_body: bool,
}

impl ConsoleReporter {
    pub fn new(show_body: bool) -> Self {
        Self { show_body }
    }
}

impl Reporter for ConsoleReporter {
    fn playbook_started(&self, playbook: &Playbook) {
        println!("{}\n", format!("Executing: {}", playbook.name).green());
    }

    fn validation_findings(&self, report: &ValidationReport) {
        for (key, messages) in report {
            for message in messages {
                eprintln!("{} {}: {}", "warning:".yellow(), key, message);
            }
        }
    }

    fn request_started(&self, index: usize, request: &RequestSpec) {
        println!("{}", format!("→ {}", request.label(index)).green());
    }

    fn request_failed(&self, _index: usize, _request: &RequestSpec, error: &PlaybookError) {
        println!("{}", error);
        println!("{}", END_OF_REQUEST.red());
    }

    fn response_received(&self, _index: usize, request: &RequestSpec, result: &ExecutionResult) {
        println!(
            "{}",
            format!(
                "{} {} [{}, {}, {}]",
                request.method.to_uppercase(),
                request.url,
                result.status,
                result.content_length,
                result.duration
            )
            .dark_grey()
        );

        let mark = if result.success {
            "✓".green()
        } else {
            "✘".red()
        };
        println!(
            "{} {}",
            mark,
            format!("Status Code is {}", result.status_code).dark_grey()
        );

        if self.show_body && !result.body.is_empty() {
            println!("{}", result.body);
        }
        println!("{}", END_OF_REQUEST.red());
    }

    fn run_aborted(&self, index: usize, request: &RequestSpec) {
        println!(
            "{}",
            format!("Stopping: '{}' failed and has exitOnError set", request.label(index)).red()
        );
    }
}
