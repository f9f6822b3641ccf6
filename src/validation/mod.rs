// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for experiment runs and backend submissions.

use crate::circuit::Circuit;
use crate::config::{ExperimentConfig, ResourceLimits};
use crate::error::{Result, ValidationError};

/// Validate a batch submission against resource limits.
pub fn validate_trials(trials: u32, limits: &ResourceLimits) -> Result<()> {
    if trials == 0 {
        return Err(ValidationError::Field {
            field: "trials".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    if trials > limits.max_trials {
        return Err(ValidationError::ResourceLimit {
            resource: "trials".into(),
            limit: limits.max_trials as u64,
            requested: trials as u64,
        }
        .into());
    }

    Ok(())
}

/// Validate that a circuit fits on a device with `num_qubits` qubits.
pub fn validate_circuit(circuit: &Circuit, num_qubits: u32) -> Result<()> {
    if circuit.measured.is_empty() {
        return Err(ValidationError::Field {
            field: "measured".into(),
            message: "circuit measures no qubits".into(),
        }
        .into());
    }

    if circuit.num_qubits > num_qubits {
        return Err(ValidationError::ResourceLimit {
            resource: "qubits".into(),
            limit: num_qubits as u64,
            requested: circuit.num_qubits as u64,
        }
        .into());
    }

    if let Some(max) = circuit.max_qubit() {
        if max >= circuit.num_qubits {
            return Err(ValidationError::Field {
                field: "gates".into(),
                message: format!(
                    "qubit {} out of range for {}-qubit circuit",
                    max, circuit.num_qubits
                ),
            }
            .into());
        }
    }

    Ok(())
}

/// Validate a sweep against resource limits.
pub fn validate_experiment(experiment: &ExperimentConfig, limits: &ResourceLimits) -> Result<()> {
    if experiment.time_steps > limits.max_time_steps {
        return Err(ValidationError::ResourceLimit {
            resource: "time_steps".into(),
            limit: limits.max_time_steps as u64,
            requested: experiment.time_steps as u64,
        }
        .into());
    }

    for run in &experiment.runs {
        validate_trials(run.trials, limits)?;

        if run.repeats == 0 {
            return Err(ValidationError::Field {
                field: format!("runs[{}].repeats", run.backend),
                message: "must be greater than 0".into(),
            }
            .into());
        }

        if run.repeats > limits.max_repeats {
            return Err(ValidationError::ResourceLimit {
                resource: "repeats".into(),
                limit: limits.max_repeats as u64,
                requested: run.repeats as u64,
            }
            .into());
        }
    }

    Ok(())
}
