// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP client abstraction for the IBM Quantum API.
//!
//! Provides [`IbmHttpClient`] trait for abstracting HTTP operations and
//! [`ReqwestIbmClient`] for production use, plus [`MockIbmClient`] for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

use crate::error::BackendError;

use super::{IbmJobRequest, IbmJobResult};

/// Trait for IBM Quantum HTTP operations.
///
/// This trait enables testing the backend without real HTTP calls.
#[async_trait]
pub trait IbmHttpClient: Send + Sync {
    /// Submit a job to IBM Quantum.
    async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, BackendError>;

    /// Get the status and, once done, the result of a submitted job.
    async fn get_job_result(&self, job_id: &str) -> Result<IbmJobResult, BackendError>;

    /// List the backends visible to the token.
    async fn available_backends(&self) -> Result<Vec<String>, BackendError>;
}

/// Production HTTP client using reqwest.
pub struct ReqwestIbmClient {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl std::fmt::Debug for ReqwestIbmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestIbmClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ReqwestIbmClient {
    /// Create a new IBM HTTP client.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Http(format!("Failed to create client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: SecretString::from(token.to_string()),
        })
    }

    async fn check_status(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(BackendError::AuthenticationFailed(format!(
                "IBM {operation} rejected ({status}): {body}"
            )));
        }
        Err(BackendError::ExecutionFailed(format!(
            "IBM {operation} returned {status}: {body}"
        )))
    }
}

#[async_trait]
impl IbmHttpClient for ReqwestIbmClient {
    async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, BackendError> {
        let url = format!("{}/v1/jobs", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Http(format!("IBM API request failed: {e}")))?;

        let response = Self::check_status(response, "job submission").await?;

        let job_response: super::IbmJobResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResult(format!("Failed to parse response: {e}")))?;

        Ok(job_response.id)
    }

    async fn get_job_result(&self, job_id: &str) -> Result<IbmJobResult, BackendError> {
        let url = format!("{}/v1/jobs/{}/results", self.base_url, job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| BackendError::Http(format!("IBM API request failed: {e}")))?;

        let response = Self::check_status(response, "job poll").await?;

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResult(format!("Failed to parse result: {e}")))
    }

    async fn available_backends(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/v1/backends", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| BackendError::Http(format!("IBM backend listing failed: {e}")))?;

        let response = Self::check_status(response, "backend listing").await?;

        let listing: super::IbmBackendList = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResult(format!("Failed to parse backends: {e}")))?;

        Ok(listing.devices)
    }
}

/// Mock IBM client for testing.
///
/// `results` are served in order, one per poll; the last one repeats.
pub struct MockIbmClient {
    pub submit_response: Result<String, BackendError>,
    pub results: Vec<Result<IbmJobResult, BackendError>>,
    pub backends: Vec<String>,
    pub submitted: Mutex<Vec<IbmJobRequest>>,
    polls: AtomicUsize,
}

impl MockIbmClient {
    /// Client whose job finishes on the first poll with `result`.
    pub fn with_result(result: IbmJobResult) -> Self {
        Self::with_results(vec![Ok(result)])
    }

    /// Client serving `results` one per poll.
    pub fn with_results(results: Vec<Result<IbmJobResult, BackendError>>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    /// Replace the availability list.
    pub fn with_backends(mut self, backends: &[&str]) -> Self {
        self.backends = backends.iter().map(|b| b.to_string()).collect();
        self
    }

    /// Number of result polls served.
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Default for MockIbmClient {
    fn default() -> Self {
        Self {
            submit_response: Ok("mock-job-id".to_string()),
            results: vec![Ok(IbmJobResult {
                status: "DONE".to_string(),
                results: Some(vec![]),
            })],
            backends: vec!["ibmq_qasm_simulator".to_string(), "ibmqx4".to_string()],
            submitted: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IbmHttpClient for MockIbmClient {
    async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, BackendError> {
        self.submitted.lock().push(request.clone());
        self.submit_response.clone()
    }

    async fn get_job_result(&self, _job_id: &str) -> Result<IbmJobResult, BackendError> {
        let i = self.polls.fetch_add(1, Ordering::SeqCst);
        let idx = i.min(self.results.len().saturating_sub(1));
        self.results
            .get(idx)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::ExecutionFailed("no mock result".into())))
    }

    async fn available_backends(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.backends.clone())
    }
}
