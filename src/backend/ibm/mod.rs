// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! IBM Quantum backend via the Qiskit Runtime REST API.
//!
//! Circuits are submitted as OpenQASM 3.0 to the `sampler` primitive, which
//! returns one sample per shot. Samples are hex-encoded integers over the
//! classical register `c`, with classical bit 0 as the least significant bit:
//! a sample of `0x1` on a two-bit register is the record `(1, 0)`.
//!
//! # Architecture
//!
//! The backend is generic over [`IbmHttpClient`], enabling deterministic
//! testing with a mock client while using [`ReqwestIbmClient`] in production.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{BackendType, QuantumBackend};
use crate::circuit::Circuit;
use crate::config::{IbmConfig, ResourceLimits};
use crate::distribution::OutcomeRecord;
use crate::error::BackendError;

use super::r#trait::{BackendInfo, HealthStatus};

use client::{IbmHttpClient, ReqwestIbmClient};

/// Name of the classical register the circuits read into.
const CLASSICAL_REGISTER: &str = "c";

/// IBM job request (Qiskit Runtime primitive format).
#[derive(Debug, Clone, Serialize)]
pub struct IbmJobRequest {
    /// Program ID ("sampler").
    pub program_id: String,
    /// Backend name.
    pub backend: String,
    /// Hub/group/project, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Input parameters.
    pub params: IbmJobParams,
}

/// IBM job input parameters.
#[derive(Debug, Clone, Serialize)]
pub struct IbmJobParams {
    /// OpenQASM 3.0 circuits.
    pub circuits: Vec<String>,
    /// Number of shots.
    pub shots: u32,
    /// Optimization level (0–3).
    pub optimization_level: u32,
}

/// IBM job response.
#[derive(Debug, Deserialize)]
pub struct IbmJobResponse {
    /// Job ID.
    pub id: String,
}

/// IBM backend listing.
#[derive(Debug, Deserialize)]
pub struct IbmBackendList {
    /// Device names.
    pub devices: Vec<String>,
}

/// IBM job result.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmJobResult {
    /// Job status.
    pub status: String,
    /// One entry per submitted circuit.
    pub results: Option<Vec<IbmCircuitResult>>,
}

/// Result of a single circuit execution.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmCircuitResult {
    /// Per-register shot data.
    pub data: HashMap<String, IbmRegisterData>,
}

/// Shot data of one classical register.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmRegisterData {
    /// One hex-encoded sample per shot.
    pub samples: Vec<String>,
    /// Register width.
    pub num_bits: usize,
}

impl IbmRegisterData {
    /// Decode samples into outcome records.
    pub fn to_records(&self) -> Result<Vec<OutcomeRecord>, BackendError> {
        self.samples
            .iter()
            .map(|s| decode_sample(s, self.num_bits))
            .collect()
    }
}

/// Decode a hex sample (`"0x2"`) into a record of `num_bits` bits.
fn decode_sample(sample: &str, num_bits: usize) -> Result<OutcomeRecord, BackendError> {
    let digits = sample
        .strip_prefix("0x")
        .or_else(|| sample.strip_prefix("0X"))
        .unwrap_or(sample);
    let value = u64::from_str_radix(digits, 16)
        .map_err(|e| BackendError::InvalidResult(format!("bad sample '{sample}': {e}")))?;

    if num_bits < 64 && value >> num_bits != 0 {
        return Err(BackendError::InvalidResult(format!(
            "sample '{sample}' does not fit in {num_bits} bits"
        )));
    }

    Ok(OutcomeRecord::from_integer(value, num_bits))
}

/// IBM Quantum backend.
pub struct IbmBackend<C: IbmHttpClient = ReqwestIbmClient> {
    config: IbmConfig,
    client: C,
    limits: ResourceLimits,
}

impl IbmBackend<ReqwestIbmClient> {
    /// Create from configuration.
    pub fn from_config(config: &IbmConfig) -> Result<Self, BackendError> {
        if !config.enabled {
            return Err(BackendError::NotFound(format!(
                "IBM backend '{}' is disabled",
                config.name
            )));
        }

        let token = config.auth_token.as_deref().ok_or_else(|| {
            BackendError::AuthenticationFailed(format!(
                "IBM API token not configured for '{}'. Set IBM_API_TOKEN or auth_token",
                config.name
            ))
        })?;

        let client = ReqwestIbmClient::new(
            &config.api_url,
            token,
            Duration::from_secs(config.request_timeout_sec),
        )?;

        info!(backend = %config.name, device = %config.device, "Initializing IBM backend");

        Ok(Self::with_client(config, client))
    }
}

impl<C: IbmHttpClient> IbmBackend<C> {
    /// Create with a custom HTTP client (for testing).
    pub fn with_client(config: &IbmConfig, client: C) -> Self {
        Self {
            config: config.clone(),
            client,
            limits: ResourceLimits {
                max_qubits: config.num_qubits,
                ..Default::default()
            },
        }
    }

    /// HTTP client in use.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Submit a job and wait for completion.
    async fn submit_and_wait(&self, qasm: String, shots: u32) -> Result<IbmJobResult, BackendError> {
        let job_request = IbmJobRequest {
            program_id: "sampler".to_string(),
            backend: self.config.device.clone(),
            instance: self.config.instance.clone(),
            params: IbmJobParams {
                circuits: vec![qasm],
                shots,
                optimization_level: 1,
            },
        };

        let job_id = self.client.submit_job(&job_request).await?;
        info!(job_id = %job_id, device = %self.config.device, shots, "IBM job submitted");

        let timeout = Duration::from_secs(self.config.job_timeout_sec);
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let start = Instant::now();

        loop {
            let result = self.client.get_job_result(&job_id).await?;

            match result.status.as_str() {
                "DONE" | "Completed" => return Ok(result),
                "FAILED" | "CANCELLED" | "ERROR" | "Failed" | "Cancelled" => {
                    return Err(BackendError::ExecutionFailed(format!(
                        "IBM job {job_id} failed with status: {}",
                        result.status
                    )));
                }
                status => {
                    if start.elapsed() >= timeout {
                        return Err(BackendError::Timeout(format!(
                            "IBM job {job_id} still {status} after {}s",
                            self.config.job_timeout_sec
                        )));
                    }
                    debug!(job_id = %job_id, status = %status, "IBM job still running");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl<C: IbmHttpClient> QuantumBackend for IbmBackend<C> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn backend_type(&self) -> BackendType {
        if self.config.simulator {
            BackendType::Simulator
        } else {
            BackendType::Hardware
        }
    }

    async fn run_trials(
        &self,
        circuit: &Circuit,
        trials: u32,
    ) -> Result<Vec<OutcomeRecord>, BackendError> {
        debug!(
            circuit = %circuit.name,
            trials,
            device = %self.config.device,
            "Running circuit on IBM backend"
        );

        if circuit.num_qubits > self.config.num_qubits {
            return Err(BackendError::InvalidRequest(format!(
                "Circuit needs {} qubits, {} has {}",
                circuit.num_qubits, self.config.device, self.config.num_qubits
            )));
        }

        let result = self.submit_and_wait(circuit.to_qasm(), trials).await?;

        let circuit_result = result
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| {
                BackendError::InvalidResult("No circuit results in IBM response".into())
            })?;

        let register = circuit_result
            .data
            .get(CLASSICAL_REGISTER)
            .ok_or_else(|| {
                BackendError::InvalidResult(format!(
                    "IBM result has no register '{CLASSICAL_REGISTER}'"
                ))
            })?;

        if register.num_bits != circuit.num_clbits() {
            return Err(BackendError::InvalidResult(format!(
                "register width {} does not match {} measured qubits",
                register.num_bits,
                circuit.num_clbits()
            )));
        }

        register.to_records()
    }

    async fn get_info(&self) -> Result<BackendInfo, BackendError> {
        Ok(BackendInfo {
            name: self.config.name.clone(),
            backend_type: self.backend_type(),
            vendor: "ibm".into(),
            device: self.config.device.clone(),
            num_qubits: self.config.num_qubits,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, BackendError> {
        match self.client.available_backends().await {
            Ok(devices) if devices.iter().any(|d| d == &self.config.device) => {
                Ok(HealthStatus::Healthy)
            }
            Ok(_) => {
                warn!(device = %self.config.device, "Device not in IBM availability list");
                Ok(HealthStatus::Degraded)
            }
            Err(e) => {
                warn!(error = %e, "IBM health check failed");
                Ok(HealthStatus::Unavailable)
            }
        }
    }

    fn resource_limits(&self) -> &ResourceLimits {
        &self.limits
    }
}
