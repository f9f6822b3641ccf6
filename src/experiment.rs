// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time sweep of the quantum beats circuit over configured backends.
//!
//! For each step `t` the experiment builds [`Circuit::quantum_beats`] with
//! `λ = larmor_frequency · t`, runs every configured batch and reduces each
//! batch to a [`DistributionTable`]. Steps, runs and repeats execute in
//! order.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{BackendRegistry, HealthStatus};
use crate::circuit::{BeatsOutcome, Circuit};
use crate::config::{ExperimentConfig, RunSpec};
use crate::distribution::{compute_distribution, DistributionTable};
use crate::error::{BackendError, Result, ValidationError};
use crate::stats::BatchSummary;
use crate::validation;

/// Results of one backend at one time step.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Backend name
    pub backend: String,
    /// Trials requested per batch
    pub trials: u32,
    /// One table per batch, in execution order
    pub distributions: Vec<DistributionTable>,
    /// Count summary per beats outcome, in [`BeatsOutcome::ALL`] order
    pub outcomes: Vec<(BeatsOutcome, BatchSummary)>,
}

impl RunSummary {
    fn from_tables(backend: &str, trials: u32, distributions: Vec<DistributionTable>) -> Self {
        let outcomes = BeatsOutcome::ALL
            .iter()
            .filter_map(|&outcome| {
                let counts: Vec<u64> = distributions
                    .iter()
                    .map(|table| table.get(&outcome.record()))
                    .collect();
                BatchSummary::from_counts(&counts).map(|summary| (outcome, summary))
            })
            .collect();

        Self {
            backend: backend.to_string(),
            trials,
            distributions,
            outcomes,
        }
    }

    /// Summary of `outcome`, if any batch ran.
    pub fn summary(&self, outcome: BeatsOutcome) -> Option<&BatchSummary> {
        self.outcomes
            .iter()
            .find(|(o, _)| *o == outcome)
            .map(|(_, s)| s)
    }

    /// Number of batches executed.
    pub fn repeats(&self) -> usize {
        self.distributions.len()
    }
}

/// Results of one time step across all runs.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Step index `t`
    pub step: u32,
    /// Phase applied at this step
    pub lambda: f64,
    /// One summary per configured run, in configuration order
    pub runs: Vec<RunSummary>,
}

/// Quantum beats sweep bound to a backend registry.
pub struct QuantumBeatsExperiment {
    config: ExperimentConfig,
    registry: Arc<BackendRegistry>,
    strict_limits: bool,
}

impl QuantumBeatsExperiment {
    /// Create a sweep over the backends in `registry`.
    ///
    /// Resource limits are enforced; see [`Self::with_strict_limits`].
    pub fn new(config: ExperimentConfig, registry: Arc<BackendRegistry>) -> Self {
        Self {
            config,
            registry,
            strict_limits: true,
        }
    }

    /// When `false`, runs over the registry's resource limits are logged
    /// instead of rejected.
    pub fn with_strict_limits(mut self, strict: bool) -> Self {
        self.strict_limits = strict;
        self
    }

    /// Sweep configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every step, handing each report to `on_step` as it completes.
    ///
    /// All run backends must be registered and report themselves healthy;
    /// both checks happen before any job is submitted. An error from
    /// `on_step` stops the sweep.
    pub async fn run<F>(&self, mut on_step: F) -> Result<Vec<StepReport>>
    where
        F: FnMut(&StepReport) -> Result<()>,
    {
        self.preflight().await?;

        info!(
            steps = self.config.time_steps,
            runs = self.config.runs.len(),
            larmor_frequency = self.config.larmor_frequency,
            "Starting quantum beats sweep"
        );

        let mut reports = Vec::with_capacity(self.config.time_steps as usize);
        for step in 0..self.config.time_steps {
            let report = self.run_step(step).await?;
            on_step(&report)?;
            reports.push(report);
        }

        info!(steps = reports.len(), "Quantum beats sweep complete");
        Ok(reports)
    }

    /// Run all configured batches for a single step.
    pub async fn run_step(&self, step: u32) -> Result<StepReport> {
        let lambda = self.config.lambda(step);
        let circuit = Circuit::quantum_beats(lambda);
        debug!(step, lambda, circuit = %circuit.name, "Running time step");

        let mut runs = Vec::with_capacity(self.config.runs.len());
        for run in &self.config.runs {
            runs.push(self.run_backend(run, &circuit).await?);
        }

        Ok(StepReport { step, lambda, runs })
    }

    async fn preflight(&self) -> Result<()> {
        self.registry
            .require_all(self.config.runs.iter().map(|r| r.backend.as_str()))?;

        for run in &self.config.runs {
            if run.repeats == 0 || run.trials == 0 {
                return Err(ValidationError::Field {
                    field: format!("runs[{}]", run.backend),
                    message: "trials and repeats must be greater than 0".into(),
                }
                .into());
            }

            if let Err(e) = validation::validate_trials(run.trials, self.registry.limits()) {
                if self.strict_limits {
                    return Err(e);
                }
                warn!(backend = %run.backend, error = %e, "Run exceeds limits (strict validation disabled)");
            }
        }

        let mut checked: Vec<&str> = Vec::new();
        for run in &self.config.runs {
            if checked.contains(&run.backend.as_str()) {
                continue;
            }
            checked.push(&run.backend);
            self.check_available(&run.backend).await?;
        }

        Ok(())
    }

    /// Ask the vendor whether the backend's device can take jobs.
    async fn check_available(&self, name: &str) -> Result<()> {
        let backend = self.registry.get(name)?;
        match backend.health_check().await? {
            HealthStatus::Healthy => {
                debug!(backend = %name, "Backend available");
                Ok(())
            }
            HealthStatus::Degraded => Err(BackendError::NotFound(format!(
                "'{name}' is not among the vendor's available devices"
            ))
            .into()),
            HealthStatus::Unavailable => {
                Err(BackendError::Unavailable(format!("'{name}' is not reachable")).into())
            }
        }
    }

    async fn run_backend(&self, run: &RunSpec, circuit: &Circuit) -> Result<RunSummary> {
        let backend = self.registry.get(&run.backend)?;
        validation::validate_circuit(circuit, backend.resource_limits().max_qubits)?;

        let mut distributions = Vec::with_capacity(run.repeats as usize);
        for batch in 0..run.repeats {
            let records = backend.run_trials(circuit, run.trials).await?;
            if records.len() != run.trials as usize {
                warn!(
                    backend = %run.backend,
                    batch,
                    requested = run.trials,
                    returned = records.len(),
                    "Backend returned a different number of records"
                );
            }

            let table = compute_distribution(&records)?;
            debug!(backend = %run.backend, batch, table = %table, "Batch aggregated");
            distributions.push(table);
        }

        Ok(RunSummary::from_tables(&run.backend, run.trials, distributions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendType;
    use crate::error::{BackendError, Error};
    use crate::test_utils::{FailingMockBackend, MockBackend};

    fn sweep(runs: Vec<RunSpec>, time_steps: u32) -> ExperimentConfig {
        ExperimentConfig {
            larmor_frequency: 0.5,
            time_steps,
            runs,
        }
    }

    fn run(backend: &str, trials: u32, repeats: u32) -> RunSpec {
        RunSpec {
            backend: backend.into(),
            trials,
            repeats,
        }
    }

    #[tokio::test]
    async fn test_sweep_steps_and_lambdas() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(MockBackend::simulator("qvm"));

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qvm", 4, 1)], 3), registry);
        let reports = experiment.run(|_| Ok(())).await.unwrap();

        assert_eq!(reports.len(), 3);
        let lambdas: Vec<f64> = reports.iter().map(|r| r.lambda).collect();
        assert_eq!(lambdas, vec![0.0, 0.5, 1.0]);
        assert_eq!(reports[2].step, 2);
    }

    #[tokio::test]
    async fn test_run_summary_counts() {
        let registry = Arc::new(BackendRegistry::default());
        let mock = Arc::new(MockBackend::with_pattern(
            "qvm",
            BackendType::Simulator,
            vec![vec![1, 0], vec![0, 1], vec![1, 0], vec![1, 1]],
        ));
        registry.register(mock.clone());

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qvm", 8, 3)], 1), registry);
        let report = experiment.run_step(0).await.unwrap();

        let summary = &report.runs[0];
        assert_eq!(summary.backend, "qvm");
        assert_eq!(summary.repeats(), 3);
        assert_eq!(summary.distributions[0].total(), 8);

        let singlet = summary.summary(BeatsOutcome::Singlet).unwrap();
        assert_eq!(singlet.samples, vec![4, 4, 4]);
        assert_eq!(singlet.mean, 4.0);
        assert_eq!(singlet.std_dev, 0.0);

        assert_eq!(summary.summary(BeatsOutcome::Triplet).unwrap().mean, 2.0);
        assert_eq!(summary.summary(BeatsOutcome::ZeroZero).unwrap().mean, 0.0);
        assert_eq!(summary.summary(BeatsOutcome::OneOne).unwrap().mean, 2.0);
        assert_eq!(mock.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_runs_keep_configuration_order() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(MockBackend::simulator("b"));
        registry.register(MockBackend::simulator("a"));

        let experiment =
            QuantumBeatsExperiment::new(sweep(vec![run("b", 2, 1), run("a", 2, 1)], 1), registry);
        let report = experiment.run_step(0).await.unwrap();
        let names: Vec<&str> = report.runs.iter().map(|r| r.backend.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_missing_backend_fails_before_any_job() {
        let registry = Arc::new(BackendRegistry::default());
        let mock = Arc::new(MockBackend::new("qvm", BackendType::Simulator));
        registry.register(mock.clone());

        let experiment = QuantumBeatsExperiment::new(
            sweep(vec![run("qvm", 4, 1), run("ibmqx4", 4, 1)], 2),
            registry,
        );
        let err = experiment.run(|_| Ok(())).await.unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::NotFound(ref m)) if m.contains("ibmqx4")));
        assert_eq!(mock.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(Arc::new(FailingMockBackend::new("qpu")));

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qpu", 4, 1)], 2), registry);
        let err = experiment.run(|_| Ok(())).await.unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::ExecutionFailed(_))));
    }

    #[tokio::test]
    async fn test_callback_error_stops_sweep() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(MockBackend::simulator("qvm"));

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qvm", 2, 1)], 5), registry);
        let mut seen = Vec::new();
        let err = experiment
            .run(|report| {
                seen.push(report.step);
                if report.step == 1 {
                    return Err(Error::Config("stop".into()));
                }
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert_eq!(seen, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_zero_repeats_rejected() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(MockBackend::simulator("qvm"));

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qvm", 2, 0)], 1), registry);
        let err = experiment.run(|_| Ok(())).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Field { .. })));
    }

    #[tokio::test]
    async fn test_inconsistent_records_surface_as_validation_error() {
        let registry = Arc::new(BackendRegistry::default());
        registry.register(Arc::new(MockBackend::with_pattern(
            "broken",
            BackendType::Simulator,
            vec![vec![1, 0], vec![1, 0, 1]],
        )));

        let experiment =
            QuantumBeatsExperiment::new(sweep(vec![run("broken", 4, 1)], 1), registry);
        let err = experiment.run_step(0).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InconsistentRecordLength { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_lenient_limits_allow_oversized_run() {
        let mut config = crate::config::Config::default();
        config.experiment.time_steps = 1;
        config.experiment.runs[0].trials = 16;
        config.validation.strict = false;
        config.validation.limits.max_trials = 8;
        assert!(config.validate().is_ok());

        let registry = Arc::new(BackendRegistry::with_limits(config.validation.limits.clone()));
        registry.register(MockBackend::simulator("rigetti_qvm"));

        let experiment = QuantumBeatsExperiment::new(config.experiment.clone(), registry)
            .with_strict_limits(config.validation.strict);
        let reports = experiment.run(|_| Ok(())).await.unwrap();
        assert_eq!(reports[0].runs[0].distributions[0].total(), 16);
    }

    #[tokio::test]
    async fn test_strict_limits_reject_oversized_run() {
        let limits = crate::config::ResourceLimits {
            max_trials: 8,
            ..Default::default()
        };
        let registry = Arc::new(BackendRegistry::with_limits(limits));
        registry.register(MockBackend::simulator("qvm"));

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("qvm", 16, 1)], 1), registry);
        let err = experiment.run(|_| Ok(())).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ResourceLimit { limit: 8, requested: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_device_missing_from_vendor_list_fails_before_submission() {
        use crate::backend::ibm::client::MockIbmClient;
        use crate::backend::ibm::IbmBackend;
        use crate::config::IbmConfig;

        let config = IbmConfig {
            name: "ibmqx4".into(),
            enabled: true,
            device: "ibmqx4_retired".into(),
            simulator: false,
            ..Default::default()
        };
        let client = MockIbmClient::default().with_backends(&["ibmq_qasm_simulator", "ibmqx2"]);
        let backend = Arc::new(IbmBackend::with_client(&config, client));

        let registry = Arc::new(BackendRegistry::default());
        registry.register(backend.clone());

        let experiment = QuantumBeatsExperiment::new(sweep(vec![run("ibmqx4", 4, 1)], 1), registry);
        let err = experiment.run(|_| Ok(())).await.unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::NotFound(ref m)) if m.contains("ibmqx4")));
        assert!(backend.client().submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_before_any_job() {
        let registry = Arc::new(BackendRegistry::default());
        let healthy = Arc::new(MockBackend::new("qvm", BackendType::Simulator));
        registry.register(healthy.clone());
        registry.register(Arc::new(
            MockBackend::new("qpu", BackendType::Hardware).with_health(HealthStatus::Unavailable),
        ));

        let experiment =
            QuantumBeatsExperiment::new(sweep(vec![run("qvm", 4, 1), run("qpu", 4, 1)], 1), registry);
        let err = experiment.run(|_| Ok(())).await.unwrap_err();

        assert!(matches!(err, Error::Backend(BackendError::Unavailable(_))));
        assert_eq!(healthy.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
