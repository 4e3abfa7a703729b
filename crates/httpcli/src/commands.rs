use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;

use httpcli_playbook::executor::parse_headers;
use httpcli_playbook::format::format_body;
use httpcli_playbook::playbook::{is_valid_url, normalize_url};
use httpcli_playbook::{
    ClientConfig, ConsoleReporter, PlaybookFile, PlaybookRunner, RequestExecutor, ReqwestTransport,
    Settings, ValidationMode,
};

fn executor(settings: &Settings, config: &ClientConfig) -> Result<RequestExecutor> {
    let transport = ReqwestTransport::new(settings)?;
    Ok(RequestExecutor::new(Arc::new(transport)).with_display(config.display()))
}

/// Send one request and print the formatted body.
pub async fn single_request(
    settings: &Settings,
    config: &ClientConfig,
    method: &str,
    url: &str,
    data: &str,
) -> Result<()> {
    let url = normalize_url(url);
    if !is_valid_url(&url) {
        bail!("please provide a valid url");
    }

    let headers = parse_headers(&config.headers)?;
    let response = executor(settings, config)?
        .execute(method, &url, &headers, data)
        .await?;

    let body = format_body(response.content_type(), &response.body, config.pretty);
    if !body.is_empty() {
        println!("{}", body);
    }
    Ok(())
}

/// Run a playbook file.
///
/// Per-request failures are reported inline and do not fail the command.
pub async fn execute(
    settings: &Settings,
    config: &ClientConfig,
    path: &Path,
    strict: bool,
    json: bool,
) -> Result<()> {
    let file = PlaybookFile::load(path)?;

    let validation = if strict {
        ValidationMode::Strict
    } else {
        settings.validation_mode()
    };

    let summary = PlaybookRunner::new(&file, executor(settings, config)?)
        .with_reporter(Arc::new(ConsoleReporter::new(config.verbose)))
        .with_validation(validation)
        .with_pretty(config.pretty)
        .run()
        .await
        .with_context(|| format!("failed to execute playbook {}", path.display()))?;

    tracing::debug!(
        requests = summary.requests.len(),
        aborted = summary.is_aborted(),
        "Playbook finished"
    );

    if json {
        let text =
            serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?;
        println!("{}", text);
    }
    Ok(())
}
