// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the Rigetti QVM / Forest web API.
//!
//! Provides the [`RigettiHttpClient`] trait for abstracting HTTP operations and
//! [`ReqwestRigettiClient`] as the production implementation with exponential
//! backoff retry logic and optional bearer token authentication.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::RigettiConfig;
use crate::error::BackendError;

use super::{RigettiJobRequest, RigettiJobResult};

/// Upper bound on a single backoff delay, jitter included.
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Abstract HTTP client for Rigetti API operations.
#[async_trait]
pub trait RigettiHttpClient: Send + Sync {
    /// Run a multishot program and return the readout.
    async fn run_multishot(
        &self,
        request: &RigettiJobRequest,
    ) -> Result<RigettiJobResult, BackendError>;

    /// Ask the endpoint for its version string.
    async fn version(&self) -> Result<String, BackendError>;
}

/// Production HTTP client using reqwest with retry logic.
pub struct ReqwestRigettiClient {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<SecretString>,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl std::fmt::Debug for ReqwestRigettiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRigettiClient")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

impl ReqwestRigettiClient {
    /// Create a new client from Rigetti configuration.
    pub fn from_config(config: &RigettiConfig) -> Result<Self, BackendError> {
        if config.endpoint.trim().is_empty() {
            return Err(BackendError::InvalidRequest(format!(
                "Rigetti endpoint not configured for '{}'. Set RIGETTI_QVM_URL or endpoint",
                config.name
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| BackendError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone().map(SecretString::from),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    fn post(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let request = self.client.post(&self.endpoint).json(body);
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Delay before retry number `attempt + 1`, jitter included.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self
            .retry_base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped = base.min(MAX_RETRY_DELAY_MS);
        let jitter = capped / 4 * (attempt as u64 % 2);
        Duration::from_millis((capped + jitter).min(MAX_RETRY_DELAY_MS))
    }

    /// POST `body` with exponential backoff retry and return the raw response.
    ///
    /// Retries on 429, 503, 504 and connect/timeout errors. Other failures
    /// are returned immediately.
    async fn post_with_retry(
        &self,
        operation: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, BackendError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let outcome = match self.post(body).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    classify_status(status, operation, &text)
                }
                Err(e) => classify_transport(e.is_connect() || e.is_timeout(), operation, &e),
            };

            match outcome {
                Attempt::Fail(err) => return Err(err),
                Attempt::Retry(err) => last_error = Some(err),
            }

            if attempt < self.max_retries {
                let delay = self.backoff_delay(attempt);
                warn!(
                    attempt = attempt + 1,
                    max = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "{operation} failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BackendError::Http(format!(
                "{operation} failed after {} retries",
                self.max_retries
            ))
        }))
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attempt {
    /// Transient; try again after backoff
    Retry(BackendError),
    /// Permanent; give up with this error
    Fail(BackendError),
}

/// Classify a non-success HTTP status.
fn classify_status(status: StatusCode, operation: &str, body: &str) -> Attempt {
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => Attempt::Retry(BackendError::Http(format!(
            "{operation} failed ({status}): {body}"
        ))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Attempt::Fail(BackendError::AuthenticationFailed(format!(
                "{operation} auth failed ({status}): {body}"
            )))
        }
        _ => Attempt::Fail(BackendError::ExecutionFailed(format!(
            "{operation} failed ({status}): {body}"
        ))),
    }
}

/// Classify a transport error; `transient` is set for connect and timeout failures.
fn classify_transport(transient: bool, operation: &str, error: &dyn std::fmt::Display) -> Attempt {
    if transient {
        Attempt::Retry(BackendError::Unavailable(format!(
            "{operation} request error: {error}"
        )))
    } else {
        Attempt::Fail(BackendError::Http(format!(
            "{operation} request error: {error}"
        )))
    }
}

#[async_trait]
impl RigettiHttpClient for ReqwestRigettiClient {
    async fn run_multishot(
        &self,
        request: &RigettiJobRequest,
    ) -> Result<RigettiJobResult, BackendError> {
        let body = serde_json::to_value(request)
            .map_err(|e| BackendError::InvalidRequest(format!("Failed to encode job: {e}")))?;

        let response = self.post_with_retry("multishot", &body).await?;
        let result: RigettiJobResult = response.json().await.map_err(|e| {
            BackendError::InvalidResult(format!("Failed to parse multishot response: {e}"))
        })?;

        debug!(shots = result.ro.len(), "Multishot response received");
        Ok(result)
    }

    async fn version(&self) -> Result<String, BackendError> {
        let body = serde_json::json!({ "type": "version" });
        let response = self.post_with_retry("version", &body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::InvalidResult(format!("Failed to read version: {e}")))?;
        Ok(text.trim().to_string())
    }
}

/// Mock Rigetti client for testing.
///
/// Readout rows are taken from `pattern` cyclically, one per trial.
pub struct MockRigettiClient {
    pub pattern: Vec<Vec<i64>>,
    pub version_response: Result<String, BackendError>,
    pub fail_with: Option<BackendError>,
    pub requests: Mutex<Vec<RigettiJobRequest>>,
    calls: AtomicUsize,
}

impl MockRigettiClient {
    /// Client that answers every shot from `pattern`.
    pub fn with_pattern(pattern: Vec<Vec<i64>>) -> Self {
        Self {
            pattern,
            ..Default::default()
        }
    }

    /// Client whose multishot calls fail with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    /// Client answering version requests with `response`.
    pub fn with_version(response: Result<String, BackendError>) -> Self {
        Self {
            version_response: response,
            ..Default::default()
        }
    }

    /// Number of multishot calls served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRigettiClient {
    fn default() -> Self {
        Self {
            pattern: vec![vec![1, 0]],
            version_response: Ok("1.17.2 [mock]".to_string()),
            fail_with: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RigettiHttpClient for MockRigettiClient {
    async fn run_multishot(
        &self,
        request: &RigettiJobRequest,
    ) -> Result<RigettiJobResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        if self.pattern.is_empty() {
            return Ok(RigettiJobResult { ro: Vec::new() });
        }

        Ok(RigettiJobResult {
            ro: (0..request.trials as usize)
                .map(|i| self.pattern[i % self.pattern.len()].clone())
                .collect(),
        })
    }

    async fn version(&self) -> Result<String, BackendError> {
        self.version_response.clone()
    }
}
