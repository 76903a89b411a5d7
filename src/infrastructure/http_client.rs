//! HTTP client for catalog crawling with retry handling
//!
//! Wraps a single `reqwest::Client` configured with the crawler's default
//! headers, timeout and redirect policy. Page and pricing GETs retry with
//! exponential backoff; HEAD probes and the inventory POST are single attempts.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::infrastructure::config::{HttpConfig, defaults};

/// HTTP client shared by every stage of the pipeline. Cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
    /// Optional context label for provenance in logs (e.g., "ImageProbe")
    context_label: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let headers = build_default_headers(&config)?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            config,
            context_label: None,
        })
    }

    /// Set a human-readable context label for logging provenance (returns self for chaining)
    pub fn with_context_label(mut self, label: &str) -> Self {
        self.context_label = Some(label.to_string());
        self
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn label(&self) -> &str {
        self.context_label.as_deref().unwrap_or("HttpClient")
    }

    /// Fetch HTML content as a string, with retries.
    ///
    /// Sends `defaults::PAGE_ACCEPT` in place of the configured API `Accept` header.
    pub async fn fetch_html_string(&self, url: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(defaults::PAGE_ACCEPT));
        let html_content = self.get_text(url, headers).await?;

        if html_content.trim().is_empty() {
            return Err(anyhow!("Empty response from {}", url));
        }

        Ok(html_content)
    }

    /// GET a response body as text, with retries
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get_text(url, HeaderMap::new()).await
    }

    async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let response = self.get_with_policy(url, &headers).await?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from: {url}"))
    }

    /// HEAD `url`, following redirects; returns the final status
    pub async fn head_status(&self, url: &str) -> Result<StatusCode> {
        debug!("[{}] HEAD {}", self.label(), url);
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| anyhow!("HEAD request failed: {}", e))?;
        Ok(response.status())
    }

    /// POST a JSON body; returns the status and the raw body regardless of status
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        extra_headers: HeaderMap,
    ) -> Result<(StatusCode, String)> {
        info!("🌐 HTTP POST ({}): {}", self.label(), url);
        let response = self
            .client
            .post(url)
            .headers(extra_headers)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?;
        Ok((status, text))
    }

    /// GET with retry policy based on HTTP status codes and network errors
    async fn get_with_policy(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        let max_attempts = self.config.max_retries.max(1);
        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=max_attempts {
            info!("🌐 HTTP GET ({}, attempt {}/{}): {}", self.label(), attempt, max_attempts, url);

            match self.client.get(url).headers(headers.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }

                    error!("❌ HTTP error {} on attempt {}: {}", status, attempt, url);
                    if !is_retryable(status) {
                        return Err(anyhow!("HTTP error {}: {}", status, url));
                    }
                    last_err = Some(anyhow!("HTTP error {}: {}", status, url));
                }
                Err(e) => {
                    warn!("⚠️ Network error on attempt {}: {}", attempt, e);
                    last_err = Some(anyhow!("HTTP request failed: {}", e));
                }
            }

            if attempt < max_attempts {
                let delay = self.backoff_delay(attempt);
                debug!("Retrying {} in {:?}", url, delay);
                sleep(delay).await;
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Unknown HTTP error for {}", url)))
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.config.retry_base_delay_ms.saturating_mul(factor))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::INTERNAL_SERVER_ERROR
    )
}

fn build_default_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.default_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {name}"))?;
        let header_value =
            HeaderValue::from_str(value).with_context(|| format!("Invalid value for header {name}"))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
