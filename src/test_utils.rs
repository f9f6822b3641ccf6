// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::r#trait::{
    BackendInfo, BackendType, HealthStatus, QuantumBackend,
};
use crate::circuit::Circuit;
use crate::config::ResourceLimits;
use crate::distribution::OutcomeRecord;
use crate::error::BackendError;

/// Mock backend that cycles through a fixed pattern of records.
pub struct MockBackend {
    pub name: String,
    pub backend_type: BackendType,
    pub limits: ResourceLimits,
    pub pattern: Vec<OutcomeRecord>,
    /// Status reported by `health_check`
    pub health: HealthStatus,
    /// Number of `run_trials` calls served
    pub calls: AtomicUsize,
}

impl MockBackend {
    /// Backend that always measures the singlet outcome (1, 0).
    pub fn new(name: &str, backend_type: BackendType) -> Self {
        Self::with_pattern(name, backend_type, vec![vec![1, 0]])
    }

    /// Backend that returns `pattern[i % pattern.len()]` for trial `i`.
    pub fn with_pattern(name: &str, backend_type: BackendType, pattern: Vec<Vec<u8>>) -> Self {
        Self {
            name: name.to_string(),
            backend_type,
            limits: ResourceLimits::default(),
            pattern: pattern
                .into_iter()
                .map(|bits| OutcomeRecord::new(bits).unwrap())
                .collect(),
            health: HealthStatus::Healthy,
            calls: AtomicUsize::new(0),
        }
    }

    /// Same backend, reporting `health` from its health check.
    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    pub fn simulator(name: &str) -> Arc<dyn QuantumBackend> {
        Arc::new(Self::new(name, BackendType::Simulator))
    }
}

#[async_trait]
impl QuantumBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    async fn run_trials(
        &self,
        _circuit: &Circuit,
        trials: u32,
    ) -> Result<Vec<OutcomeRecord>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..trials as usize)
            .map(|i| self.pattern[i % self.pattern.len()].clone())
            .collect())
    }

    async fn get_info(&self) -> Result<BackendInfo, BackendError> {
        Ok(BackendInfo {
            name: self.name.clone(),
            backend_type: self.backend_type,
            vendor: "mock".to_string(),
            device: "mock".to_string(),
            num_qubits: 2,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus, BackendError> {
        Ok(self.health)
    }

    fn resource_limits(&self) -> &ResourceLimits {
        &self.limits
    }
}

/// Mock backend that answers health checks but fails every job.
pub struct FailingMockBackend {
    pub name: String,
    pub limits: ResourceLimits,
}

impl FailingMockBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            limits: ResourceLimits::default(),
        }
    }
}

#[async_trait]
impl QuantumBackend for FailingMockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Hardware
    }

    async fn run_trials(
        &self,
        _circuit: &Circuit,
        _trials: u32,
    ) -> Result<Vec<OutcomeRecord>, BackendError> {
        Err(BackendError::ExecutionFailed(
            "mock execution failure".to_string(),
        ))
    }

    async fn get_info(&self) -> Result<BackendInfo, BackendError> {
        Err(BackendError::Unavailable(
            "mock backend unavailable".to_string(),
        ))
    }

    async fn health_check(&self) -> Result<HealthStatus, BackendError> {
        Ok(HealthStatus::Healthy)
    }

    fn resource_limits(&self) -> &ResourceLimits {
        &self.limits
    }
}
