//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::redirect::Policy;
use std::time::Instant;

use crate::config::Settings;
use crate::error::{PlaybookError, PlaybookResult};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Transport over a reqwest client that never follows redirects.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport configured from settings.
    pub fn new(settings: &Settings) -> PlaybookResult<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(settings.user_agent.clone());

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| PlaybookError::Transport(format!("failed to build HTTP client - {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, PlaybookError> {
        let mut builder = self.client.request(request.method.into(), request.url.as_str());

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let duration = start.elapsed();

        let status = response.status();
        let version = format!("{:?}", response.version());
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response.bytes().await.map_err(|e| {
            PlaybookError::Transport(format!("error occurred reading response body - {}", e))
        })?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            elapsed_ms = duration.as_millis() as u64,
            "Received HTTP response"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            version,
            headers,
            content_length,
            duration,
            body: body.to_vec(),
        })
    }
}
