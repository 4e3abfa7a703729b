//! Request dispatch.

use crossterm::style::Stylize;
use std::sync::Arc;

use crate::error::{PlaybookError, PlaybookResult};
use crate::playbook::{is_valid_url, HttpMethod, RequestSpec};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Console side effects of dispatching a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Print the request line, headers and body before sending.
    pub verbose: bool,
    /// Print the response status line and headers.
    pub include_headers: bool,
}

/// Parse one `Key: Value` header entry.
pub fn parse_header(entry: &str) -> PlaybookResult<(String, String)> {
    match entry.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(PlaybookError::InvalidHeader(entry.to_string())),
    }
}

/// Parse header entries into a mapping.
///
/// Later entries replace earlier ones with the same name (case-insensitive),
/// keeping the position of the first.
pub fn parse_headers<S: AsRef<str>>(entries: &[S]) -> PlaybookResult<Vec<(String, String)>> {
    let mut headers: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let (key, value) = parse_header(entry.as_ref())?;
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => existing.1 = value,
            None => headers.push((key, value)),
        }
    }
    Ok(headers)
}

/// Dispatches requests to a transport according to their method.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    display: DisplayOptions,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            display: DisplayOptions::default(),
        }
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    /// Execute a single request.
    ///
    /// GET and HEAD are sent without a body whatever `body` holds; PUT, POST
    /// and DELETE always send `body`, even when empty. A URL without a scheme
    /// and host never reaches the transport.
    pub async fn execute(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> PlaybookResult<HttpResponse> {
        let method: HttpMethod = method.parse()?;
        if !is_valid_url(url) {
            return Err(PlaybookError::InvalidUrl(url.to_string()));
        }
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
            body: method.sends_body().then(|| body.to_string()),
        };

        if self.display.verbose {
            print_request(&request);
        }

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            has_body = request.body.is_some(),
            "Executing HTTP request"
        );

        let response = self.transport.send(&request).await?;

        if self.display.include_headers {
            print_response_head(&response);
        }

        Ok(response)
    }

    /// Execute a playbook request, parsing its header entries first.
    pub async fn execute_spec(&self, spec: &RequestSpec) -> PlaybookResult<HttpResponse> {
        let headers = parse_headers(&spec.headers)?;
        self.execute(&spec.method, &spec.url, &headers, &spec.data).await
    }
}

fn print_request(request: &HttpRequest) {
    println!(
        "{} {} {}/{}",
        request.method.as_str().cyan(),
        request.url,
        "HTTP".cyan(),
        "1.1".magenta()
    );
    for (key, value) in &request.headers {
        println!("{}: {}", key.as_str().blue(), value);
    }
    if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
        println!("\n{}\n", body);
    }
}

fn print_response_head(response: &HttpResponse) {
    let (proto, version) = response
        .version
        .split_once('/')
        .unwrap_or(("HTTP", response.version.as_str()));
    println!(
        "{}/{} {}",
        proto.cyan(),
        version.magenta(),
        response.status_line().magenta()
    );
    for (key, value) in &response.headers {
        println!("{}: {}", key.as_str().blue(), value);
    }
    println!();
}
