//! Playbook execution.

use std::sync::Arc;

use crate::error::{PlaybookError, PlaybookResult};
use crate::executor::RequestExecutor;
use crate::extractor::ResponseExtractor;
use crate::playbook::{describe_report, Playbook, PlaybookFile, RequestSpec, ValidationMode};
use crate::report::{ConsoleReporter, Reporter};
use crate::result::{ExecutionResult, RequestOutcome, RunOutcome, RunSummary};
use crate::template::TemplateReconciler;
use crate::variables::VariableStore;

/// Runs a playbook's requests in order, threading extracted variables
/// into the requests that follow.
///
/// A runner is consumed by [`run`](Self::run); it holds the live document and
/// variable store for exactly one run and is not meant to be shared.
pub struct PlaybookRunner {
    source: String,
    playbook: Playbook,
    variables: VariableStore,
    executor: RequestExecutor,
    extractor: ResponseExtractor,
    reconciler: TemplateReconciler,
    reporter: Arc<dyn Reporter>,
    validation: ValidationMode,
    pretty: bool,
}

impl PlaybookRunner {
    pub fn new(file: &PlaybookFile, executor: RequestExecutor) -> Self {
        let playbook = file.playbook().clone();
        let variables = VariableStore::from(playbook.variables.clone());
        Self {
            source: file.source().to_string(),
            playbook,
            variables,
            executor,
            extractor: ResponseExtractor::new(),
            reconciler: TemplateReconciler::new(),
            reporter: Arc::new(ConsoleReporter::default()),
            validation: ValidationMode::default(),
            pretty: true,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_extractor(mut self, extractor: ResponseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Pretty print bodies handed to the reporter.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Execute every request in order.
    ///
    /// Transport-class failures are reported and either skipped or, when the
    /// request has `exitOnError`, end the run as [`RunOutcome::Aborted`].
    /// Template failures and strict validation failures are returned as
    /// errors: the document cannot be trusted after them.
    pub async fn run(mut self) -> PlaybookResult<RunSummary> {
        if !self.variables.is_empty() {
            self.reconcile()?;
        }

        self.validate()?;
        self.reporter.playbook_started(&self.playbook);

        let total = self.playbook.requests.len();
        let mut outcomes = Vec::with_capacity(total);

        for index in 0..total {
            // Re-renders replace the document, so take this request's current form.
            let request = self.playbook.requests[index].clone();
            self.reporter.request_started(index, &request);

            let response = match self.executor.execute_spec(&request).await {
                Ok(response) => response,
                Err(e) if e.is_request_scoped() => {
                    tracing::warn!(request = %request.label(index), error = %e, "Request failed");
                    self.reporter.request_failed(index, &request, &e);
                    outcomes.push(outcome(index, &request, None, Some(e.to_string()), false));

                    if request.abort_on_error {
                        self.reporter.run_aborted(index, &request);
                        return Ok(self.summary(
                            RunOutcome::Aborted {
                                index,
                                name: request.label(index),
                            },
                            outcomes,
                        ));
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            let result = ExecutionResult::from_response(&response, self.pretty);
            self.reporter.response_received(index, &request, &result);

            let mut changed = false;
            if result.success && !request.extract.is_empty() {
                let extraction = self.extractor.extract(&request.extract, &response.body);
                if extraction.changed {
                    self.variables.merge(&extraction.values);
                    self.reconcile()?;
                    changed = true;
                }
            }

            outcomes.push(outcome(index, &request, Some(response.status), None, changed));
        }

        Ok(self.summary(RunOutcome::Completed, outcomes))
    }

    /// Replace the live document with one rendered from current variables.
    ///
    /// Requests already executed keep the outcome they had; only requests
    /// after the current index read from the new document.
    fn reconcile(&mut self) -> PlaybookResult<()> {
        self.playbook =
            self.reconciler
                .reconcile_against(&self.source, &self.variables, &self.playbook)?;
        Ok(())
    }

    fn validate(&self) -> PlaybookResult<()> {
        let report = self.playbook.validate();
        if report.is_empty() {
            return Ok(());
        }

        tracing::warn!(requests = report.len(), "Playbook has validation findings");
        self.reporter.validation_findings(&report);

        match self.validation {
            ValidationMode::Warn => Ok(()),
            ValidationMode::Strict => Err(PlaybookError::Validation(describe_report(&report))),
        }
    }

    fn summary(self, outcome: RunOutcome, requests: Vec<RequestOutcome>) -> RunSummary {
        RunSummary {
            outcome,
            requests,
            variables: self.variables.as_map().clone(),
        }
    }
}

fn outcome(
    index: usize,
    request: &RequestSpec,
    status_code: Option<u16>,
    error: Option<String>,
    variables_changed: bool,
) -> RequestOutcome {
    RequestOutcome {
        index,
        name: request.label(index),
        method: request.method.to_uppercase(),
        url: request.url.clone(),
        status_code,
        error,
        variables_changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playbook::ValidationReport;
    use crate::transport::{HttpRequest, HttpResponse, Transport};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers each URL from a script; unscripted URLs fail like a refused
    /// connection.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn respond(self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back((status, body.to_string()));
            self
        }

        fn urls(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|r| r.url.clone()).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, PlaybookError> {
            self.sent.lock().unwrap().push(request.clone());
            let next = self
                .responses
                .lock()
                .unwrap()
                .get_mut(&request.url)
                .and_then(|q| q.pop_front());
            let (status, body) = next.ok_or_else(|| {
                PlaybookError::Transport(format!(
                    "error occurred performing request - connection refused ({})",
                    request.url
                ))
            })?;
            Ok(HttpResponse {
                status,
                reason: String::new(),
                version: "HTTP/1.1".to_string(),
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                content_length: Some(body.len() as u64),
                duration: Duration::from_millis(3),
                body: body.into_bytes(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn playbook_started(&self, playbook: &Playbook) {
            self.push(format!("start {}", playbook.name));
        }
        fn validation_findings(&self, report: &ValidationReport) {
            self.push(format!("findings {}", report.len()));
        }
        fn request_started(&self, index: usize, request: &RequestSpec) {
            self.push(format!("request {}", request.label(index)));
        }
        fn request_failed(&self, index: usize, request: &RequestSpec, _error: &PlaybookError) {
            self.push(format!("failed {}", request.label(index)));
        }
        fn response_received(&self, index: usize, request: &RequestSpec, result: &ExecutionResult) {
            self.push(format!("response {} {}", request.label(index), result.status_code));
        }
        fn run_aborted(&self, index: usize, request: &RequestSpec) {
            self.push(format!("aborted {}", request.label(index)));
        }
    }

    struct Harness {
        transport: Arc<ScriptedTransport>,
        reporter: Arc<RecordingReporter>,
    }

    impl Harness {
        fn new(transport: ScriptedTransport) -> Self {
            Self {
                transport: Arc::new(transport),
                reporter: Arc::new(RecordingReporter::default()),
            }
        }

        fn runner(&self, source: &str) -> PlaybookRunner {
            let file = PlaybookFile::from_source("test.yaml", source).unwrap();
            let executor = RequestExecutor::new(self.transport.clone());
            PlaybookRunner::new(&file, executor).with_reporter(self.reporter.clone())
        }

        fn events(&self) -> Vec<String> {
            self.reporter.events.lock().unwrap().clone()
        }
    }

    const CHAIN: &str = r#"
name: chain
requests:
  - name: A
    method: GET
    url: http://x/1
    parse:
      token: .id
  - name: B
    method: GET
    url: http://{{token}}/2
"#;

    #[tokio::test]
    async fn test_extracted_variable_reaches_next_request() {
        let harness = Harness::new(
            ScriptedTransport::default()
                .respond("http://x/1", 200, r#"{"id":"42"}"#)
                .respond("http://42/2", 200, "{}"),
        );

        let summary = harness.runner(CHAIN).run().await.unwrap();

        assert_eq!(harness.transport.urls(), vec!["http://x/1", "http://42/2"]);
        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.variables["token"], "42");
        assert!(summary.requests[0].variables_changed);
        assert_eq!(summary.requests[1].url, "http://42/2");
    }

    #[tokio::test]
    async fn test_error_status_skips_extraction() {
        let harness = Harness::new(
            ScriptedTransport::default().respond("http://x/1", 404, r#"{"id":"42"}"#),
        );

        let summary = harness.runner(CHAIN).run().await.unwrap();

        assert!(!summary.variables.contains_key("token"));
        assert!(!summary.requests[0].variables_changed);
        assert_eq!(summary.requests[0].status_code, Some(404));
        // B still holds the placeholder and is rejected before dispatch.
        assert!(summary.requests[1]
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Invalid URL")));
        assert_eq!(harness.transport.urls(), vec!["http://x/1"]);
        assert_eq!(summary.outcome, RunOutcome::Completed);
    }

    #[tokio::test]
    async fn test_abort_on_error_stops_run() {
        let source = r#"
name: abort
requests:
  - name: first
    method: GET
    url: http://down/1
    exitOnError: true
  - name: second
    method: GET
    url: http://x/2
"#;
        let harness = Harness::new(ScriptedTransport::default().respond("http://x/2", 200, "{}"));

        let summary = harness.runner(source).run().await.unwrap();

        assert_eq!(
            summary.outcome,
            RunOutcome::Aborted {
                index: 0,
                name: "first".to_string()
            }
        );
        assert_eq!(harness.transport.urls(), vec!["http://down/1"]);
        assert_eq!(
            harness.events(),
            vec!["start abort", "request first", "failed first", "aborted first"]
        );
    }

    #[tokio::test]
    async fn test_failure_without_abort_continues() {
        let source = r#"
name: continue
requests:
  - name: first
    method: GET
    url: http://down/1
  - name: second
    method: GET
    url: http://x/2
"#;
        let harness = Harness::new(ScriptedTransport::default().respond("http://x/2", 200, "{}"));

        let summary = harness.runner(source).run().await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(harness.transport.urls(), vec!["http://down/1", "http://x/2"]);
        assert_eq!(summary.responded().collect::<Vec<_>>(), vec!["second"]);
    }

    #[tokio::test]
    async fn test_initial_variables_render_before_first_request() {
        let source = r#"
name: vars
variables:
  host: api.local
requests:
  - name: one
    method: get
    url: http://{{ host }}/users
"#;
        let harness =
            Harness::new(ScriptedTransport::default().respond("http://api.local/users", 200, "[]"));

        let summary = harness.runner(source).run().await.unwrap();

        assert_eq!(harness.transport.urls(), vec!["http://api.local/users"]);
        assert!(summary.requests[0].error.is_none());
        assert!(!harness.events().iter().any(|e| e.starts_with("findings")));
    }

    #[tokio::test]
    async fn test_variables_only_grow() {
        let source = r#"
name: grow
variables:
  base: x
requests:
  - name: one
    method: GET
    url: http://{{ base }}/1
    parse:
      id: .id
  - name: two
    method: GET
    url: http://{{ base }}/2
    parse:
      id: .id
      other: .missing
"#;
        let harness = Harness::new(
            ScriptedTransport::default()
                .respond("http://x/1", 200, r#"{"id": 1}"#)
                .respond("http://x/2", 200, r#"{"id": 2}"#),
        );

        let summary = harness.runner(source).run().await.unwrap();

        assert_eq!(summary.variables.len(), 2);
        assert_eq!(summary.variables["base"], "x");
        assert_eq!(summary.variables["id"], "2");
    }

    #[tokio::test]
    async fn test_malformed_header_is_request_scoped() {
        let source = r#"
name: headers
requests:
  - name: bad
    method: GET
    url: http://x/1
    headers: ["NoColon"]
  - name: good
    method: GET
    url: http://x/2
"#;
        let harness = Harness::new(ScriptedTransport::default().respond("http://x/2", 200, "{}"));

        let summary = harness.runner(source).run().await.unwrap();

        assert_eq!(harness.transport.urls(), vec!["http://x/2"]);
        assert!(summary.requests[0].error.as_deref().unwrap().contains("NoColon"));
    }

    const INVALID: &str = r#"
name: invalid
requests:
  - method: FETCH
    url: http://x/1
"#;

    #[tokio::test]
    async fn test_warn_mode_runs_invalid_playbook() {
        let harness = Harness::new(ScriptedTransport::default());

        let summary = harness.runner(INVALID).run().await.unwrap();

        assert_eq!(harness.events()[0], "findings 1");
        assert!(summary.requests[0]
            .error
            .as_deref()
            .unwrap()
            .contains("Unsupported method"));
        assert!(harness.transport.urls().is_empty());
    }

    #[tokio::test]
    async fn test_strict_mode_blocks_invalid_playbook() {
        let harness = Harness::new(ScriptedTransport::default());

        let err = harness
            .runner(INVALID)
            .with_validation(ValidationMode::Strict)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PlaybookError::Validation(msg) if msg.contains("request #0")));
        assert!(harness.transport.urls().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_render_stops_run() {
        let source = r#"
name: broken
requests:
  - name: A
    method: GET
    url: http://x/1
    parse:
      payload: .value
  - name: B
    method: POST
    url: http://x/2
    data: x{{ payload }}
"#;
        let harness = Harness::new(
            ScriptedTransport::default().respond("http://x/1", 200, r#"{"value": "a: [b"}"#),
        );

        let err = harness.runner(source).run().await.unwrap_err();

        assert!(matches!(err, PlaybookError::Template(_)));
        assert_eq!(harness.transport.urls(), vec!["http://x/1"]);
        assert_eq!(harness.events(), vec!["start broken", "request A", "response A 200"]);
    }
}
