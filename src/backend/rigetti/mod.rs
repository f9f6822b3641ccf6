// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rigetti backend speaking the QVM multishot protocol.
//!
//! The same protocol serves the local QVM (`qvm -S`), its noisy variants
//! and hosted QPU endpoints. A job is a single POST carrying compiled Quil;
//! the response holds one readout row per trial under the `ro` register:
//!
//! ```text
//! {"ro": [[1, 0], [0, 1], ...]}
//! ```
//!
//! Row entry `i` is the value of `ro[i]`, so rows map onto outcome records
//! without reordering.

pub mod client;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::r#trait::{BackendInfo, HealthStatus};
use super::{BackendType, QuantumBackend};
use crate::circuit::Circuit;
use crate::config::{ResourceLimits, RigettiConfig};
use crate::distribution::OutcomeRecord;
use crate::error::BackendError;

use client::{ReqwestRigettiClient, RigettiHttpClient};

/// Readout register declared by [`Circuit::to_quil`].
const READOUT_REGISTER: &str = "ro";

/// Multishot job request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RigettiJobRequest {
    /// Always "multishot".
    #[serde(rename = "type")]
    pub kind: String,
    /// Registers to return.
    pub addresses: HashMap<String, bool>,
    /// Number of trials.
    pub trials: u32,
    /// Quil program text.
    pub compiled_quil: String,
    /// Pauli X/Y/Z error probabilities applied after each gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_noise: Option<[f64; 3]>,
    /// Pauli X/Y/Z error probabilities applied before each measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_noise: Option<[f64; 3]>,
}

impl RigettiJobRequest {
    /// Multishot request reading back the `ro` register.
    pub fn multishot(quil: String, trials: u32) -> Self {
        let mut addresses = HashMap::new();
        addresses.insert(READOUT_REGISTER.to_string(), true);
        Self {
            kind: "multishot".to_string(),
            addresses,
            trials,
            compiled_quil: quil,
            gate_noise: None,
            measurement_noise: None,
        }
    }
}

/// Multishot job result.
#[derive(Debug, Clone, Deserialize)]
pub struct RigettiJobResult {
    /// One readout row per trial.
    #[serde(default)]
    pub ro: Vec<Vec<i64>>,
}

/// Rigetti backend.
pub struct RigettiBackend<C: RigettiHttpClient = ReqwestRigettiClient> {
    config: RigettiConfig,
    client: C,
    limits: ResourceLimits,
}

impl RigettiBackend<ReqwestRigettiClient> {
    /// Create from configuration.
    pub fn from_config(config: &RigettiConfig) -> Result<Self, BackendError> {
        if !config.enabled {
            return Err(BackendError::NotFound(format!(
                "Rigetti backend '{}' is disabled",
                config.name
            )));
        }

        if config.hardware && config.api_token.is_none() {
            return Err(BackendError::AuthenticationFailed(format!(
                "Rigetti API token not configured for QPU '{}'. Set RIGETTI_API_TOKEN or api_token",
                config.name
            )));
        }

        let client = ReqwestRigettiClient::from_config(config)?;

        info!(
            backend = %config.name,
            endpoint = %config.endpoint,
            device = %config.device,
            "Initializing Rigetti backend"
        );

        Ok(Self::with_client(config, client))
    }
}

impl<C: RigettiHttpClient> RigettiBackend<C> {
    /// Create with a custom HTTP client (for testing).
    pub fn with_client(config: &RigettiConfig, client: C) -> Self {
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

    fn build_request(&self, circuit: &Circuit, trials: u32) -> RigettiJobRequest {
        RigettiJobRequest {
            gate_noise: self.config.gate_noise,
            measurement_noise: self.config.measurement_noise,
            ..RigettiJobRequest::multishot(circuit.to_quil(), trials)
        }
    }
}

/// Convert readout rows into records of `width` bits.
fn parse_readout(rows: &[Vec<i64>], width: usize) -> Result<Vec<OutcomeRecord>, BackendError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != width {
                return Err(BackendError::InvalidResult(format!(
                    "readout row {i} has {} entries, expected {width}",
                    row.len()
                )));
            }
            OutcomeRecord::from_readout(row.as_slice())
                .map_err(|e| BackendError::InvalidResult(format!("readout row {i}: {e}")))
        })
        .collect()
}

#[async_trait]
impl<C: RigettiHttpClient> QuantumBackend for RigettiBackend<C> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn backend_type(&self) -> BackendType {
        if self.config.hardware {
            BackendType::Hardware
        } else {
            BackendType::Simulator
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
            endpoint = %self.config.endpoint,
            "Running circuit on Rigetti backend"
        );

        if circuit.num_qubits > self.config.num_qubits {
            return Err(BackendError::InvalidRequest(format!(
                "Circuit needs {} qubits, {} has {}",
                circuit.num_qubits, self.config.device, self.config.num_qubits
            )));
        }

        let request = self.build_request(circuit, trials);
        let result = self.client.run_multishot(&request).await?;

        if result.ro.len() != trials as usize {
            warn!(
                backend = %self.config.name,
                requested = trials,
                returned = result.ro.len(),
                "Rigetti returned a different number of trials"
            );
        }

        parse_readout(&result.ro, circuit.num_clbits())
    }

    async fn get_info(&self) -> Result<BackendInfo, BackendError> {
        Ok(BackendInfo {
            name: self.config.name.clone(),
            backend_type: self.backend_type(),
            vendor: "rigetti".into(),
            device: self.config.device.clone(),
            num_qubits: self.config.num_qubits,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, BackendError> {
        match self.client.version().await {
            Ok(version) => {
                debug!(backend = %self.config.name, version = %version, "Rigetti endpoint is up");
                Ok(HealthStatus::Healthy)
            }
            Err(BackendError::AuthenticationFailed(msg)) => {
                warn!(backend = %self.config.name, error = %msg, "Rigetti endpoint rejected credentials");
                Ok(HealthStatus::Degraded)
            }
            Err(e) => {
                warn!(backend = %self.config.name, error = %e, "Rigetti health check failed");
                Ok(HealthStatus::Unavailable)
            }
        }
    }

    fn resource_limits(&self) -> &ResourceLimits {
        &self.limits
    }
}
