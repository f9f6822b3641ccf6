// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum backend trait definition.

use async_trait::async_trait;

use crate::circuit::Circuit;
use crate::config::ResourceLimits;
use crate::distribution::OutcomeRecord;
use crate::error::BackendError;

/// Type of backend (simulator or hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Local or remote simulator
    Simulator,
    /// Real quantum hardware
    Hardware,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Simulator => write!(f, "simulator"),
            BackendType::Hardware => write!(f, "hardware"),
        }
    }
}

/// Health status of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational
    Healthy,
    /// Backend answers but reports a problem
    Degraded,
    /// Backend is not available
    Unavailable,
}

/// Static description of a backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend name
    pub name: String,
    /// Type of backend
    pub backend_type: BackendType,
    /// Vendor (e.g. "ibm", "rigetti")
    pub vendor: String,
    /// Device or simulator the backend targets
    pub device: String,
    /// Number of qubits
    pub num_qubits: u32,
}

/// The trait that all quantum backends must implement.
#[async_trait]
pub trait QuantumBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Execute `circuit` `trials` times and return one record per trial.
    ///
    /// Records are in arbitrary order; each has one bit per measured qubit.
    async fn run_trials(
        &self,
        circuit: &Circuit,
        trials: u32,
    ) -> Result<Vec<OutcomeRecord>, BackendError>;

    /// Get backend information.
    async fn get_info(&self) -> Result<BackendInfo, BackendError>;

    /// Check backend health.
    async fn health_check(&self) -> Result<HealthStatus, BackendError>;

    /// Get resource limits.
    fn resource_limits(&self) -> &ResourceLimits;
}
