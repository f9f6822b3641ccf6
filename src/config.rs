// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QUANTUM_BEATS_*, IBM_*, RIGETTI_*)
//! 4. CLI arguments
//!
//! Vendor credentials live here and are handed to backend constructors;
//! nothing is registered globally.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend configurations
    #[serde(default)]
    pub backends: BackendsConfig,

    /// Experiment sweep
    #[serde(default)]
    pub experiment: ExperimentConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            let content = std::fs::read_to_string(path)?;
            config = serde_yaml::from_str(&content)?;
        } else {
            for path in &["config.yaml", "config.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUANTUM_BEATS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUANTUM_BEATS_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("QUANTUM_BEATS_TIME_STEPS") {
            if let Ok(steps) = val.parse() {
                self.experiment.time_steps = steps;
            }
        }
        if let Ok(val) = env::var("QUANTUM_BEATS_LARMOR_FREQUENCY") {
            if let Ok(freq) = val.parse() {
                self.experiment.larmor_frequency = freq;
            }
        }

        // Tokens fill in entries that do not carry their own
        if let Ok(val) = env::var("IBM_API_TOKEN") {
            for ibm in self.backends.ibm.iter_mut().filter(|b| b.auth_token.is_none()) {
                ibm.auth_token = Some(val.clone());
            }
        }
        if let Ok(val) = env::var("RIGETTI_API_TOKEN") {
            for rigetti in self
                .backends
                .rigetti
                .iter_mut()
                .filter(|b| b.api_token.is_none())
            {
                rigetti.api_token = Some(val.clone());
            }
        }
        if let Ok(val) = env::var("RIGETTI_QVM_URL") {
            for rigetti in self.backends.rigetti.iter_mut().filter(|b| !b.hardware) {
                rigetti.endpoint = val.clone();
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let names = self.backends.names();
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!("Duplicate backend name '{}'", name)));
            }
        }

        let exp = &self.experiment;
        if exp.time_steps == 0 {
            return Err(Error::Config("time_steps must be greater than 0".into()));
        }
        if !exp.larmor_frequency.is_finite() {
            return Err(Error::Config("larmor_frequency must be finite".into()));
        }
        if exp.runs.is_empty() {
            return Err(Error::Config(
                "experiment.runs must name at least one backend".into(),
            ));
        }

        let enabled = self.backends.enabled_names();
        for run in &exp.runs {
            if !names.contains(&run.backend) {
                return Err(Error::Config(format!(
                    "Run references unknown backend '{}'",
                    run.backend
                )));
            }
            if !enabled.contains(&run.backend) {
                return Err(Error::Config(format!(
                    "Run references disabled backend '{}'",
                    run.backend
                )));
            }
        }

        let limits = &self.validation.limits;
        if self.validation.strict {
            crate::validation::validate_experiment(exp, limits)?;
        } else if let Err(e) = crate::validation::validate_experiment(exp, limits) {
            tracing::warn!(error = %e, "Experiment exceeds limits (strict validation disabled)");
        }

        for ibm in self.backends.ibm.iter().filter(|b| b.enabled) {
            if ibm.poll_interval_ms == 0 {
                return Err(Error::Config(format!(
                    "Backend '{}': poll_interval_ms cannot be 0",
                    ibm.name
                )));
            }
        }
        for rigetti in self.backends.rigetti.iter().filter(|b| b.enabled) {
            if rigetti.endpoint.is_empty() {
                return Err(Error::Config(format!(
                    "Backend '{}': endpoint is not set",
                    rigetti.name
                )));
            }
        }

        Ok(())
    }

    /// Copy with every credential replaced by a placeholder, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for ibm in &mut config.backends.ibm {
            if ibm.auth_token.is_some() {
                ibm.auth_token = Some(REDACTED.to_string());
            }
        }
        for rigetti in &mut config.backends.rigetti {
            if rigetti.api_token.is_some() {
                rigetti.api_token = Some(REDACTED.to_string());
            }
        }
        config
    }
}

const REDACTED: &str = "[REDACTED]";

fn default_true() -> bool {
    true
}

/// Backend configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// IBM Quantum backends
    #[serde(default)]
    pub ibm: Vec<IbmConfig>,

    /// Rigetti backends
    #[serde(default)]
    pub rigetti: Vec<RigettiConfig>,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            ibm: Vec::new(),
            rigetti: vec![RigettiConfig::default()],
        }
    }
}

impl BackendsConfig {
    /// Names of all configured backends.
    pub fn names(&self) -> Vec<String> {
        self.ibm
            .iter()
            .map(|b| b.name.clone())
            .chain(self.rigetti.iter().map(|b| b.name.clone()))
            .collect()
    }

    /// Names of enabled backends.
    pub fn enabled_names(&self) -> Vec<String> {
        self.ibm
            .iter()
            .filter(|b| b.enabled)
            .map(|b| b.name.clone())
            .chain(
                self.rigetti
                    .iter()
                    .filter(|b| b.enabled)
                    .map(|b| b.name.clone()),
            )
            .collect()
    }
}

/// IBM Quantum backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmConfig {
    /// Registry name
    #[serde(default = "default_ibm_name")]
    pub name: String,

    /// Whether the backend is enabled
    #[serde(default)]
    pub enabled: bool,

    /// IBM Quantum API URL
    #[serde(default = "default_ibm_api_url")]
    pub api_url: String,

    /// API token
    #[serde(default)]
    pub auth_token: Option<String>,

    /// IBM instance (hub/group/project)
    #[serde(default)]
    pub instance: Option<String>,

    /// Device name (e.g. "ibmqx4", "ibmq_qasm_simulator")
    #[serde(default = "default_ibm_device")]
    pub device: String,

    /// Whether `device` is a simulator
    #[serde(default = "default_true")]
    pub simulator: bool,

    /// Number of qubits on the device
    #[serde(default = "default_ibm_qubits")]
    pub num_qubits: u32,

    /// Job timeout in seconds
    #[serde(default = "default_job_timeout")]
    pub job_timeout_sec: u64,

    /// Interval between job status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
}

impl Default for IbmConfig {
    fn default() -> Self {
        Self {
            name: default_ibm_name(),
            enabled: false,
            api_url: default_ibm_api_url(),
            auth_token: None,
            instance: None,
            device: default_ibm_device(),
            simulator: true,
            num_qubits: default_ibm_qubits(),
            job_timeout_sec: default_job_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_sec: default_request_timeout(),
        }
    }
}

fn default_ibm_name() -> String {
    "ibm_simulator".into()
}

fn default_ibm_api_url() -> String {
    "https://api.quantum-computing.ibm.com".into()
}

fn default_ibm_device() -> String {
    "ibmq_qasm_simulator".into()
}

fn default_ibm_qubits() -> u32 {
    32
}

fn default_job_timeout() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_request_timeout() -> u64 {
    30
}

/// Rigetti backend configuration.
///
/// The same multishot endpoint serves the ideal QVM, a noisy QVM (when noise
/// parameters are set) and QPU gateways (with `hardware: true` and a token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigettiConfig {
    /// Registry name
    #[serde(default = "default_rigetti_name")]
    pub name: String,

    /// Whether the backend is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Multishot endpoint URL
    #[serde(default = "default_rigetti_endpoint")]
    pub endpoint: String,

    /// API token (required for QPU gateways)
    #[serde(default)]
    pub api_token: Option<String>,

    /// Device name (e.g. "8Q-Agave"); informational for the QVM
    #[serde(default = "default_rigetti_device")]
    pub device: String,

    /// Whether the endpoint runs on physical hardware
    #[serde(default)]
    pub hardware: bool,

    /// Number of qubits on the device
    #[serde(default = "default_rigetti_qubits")]
    pub num_qubits: u32,

    /// Pauli X/Y/Z error probabilities applied after every gate
    #[serde(default)]
    pub gate_noise: Option<[f64; 3]>,

    /// Pauli X/Y/Z error probabilities applied before every measurement
    #[serde(default)]
    pub measurement_noise: Option<[f64; 3]>,

    /// Request timeout in seconds
    #[serde(default = "default_rigetti_timeout")]
    pub timeout_sec: u64,

    /// Maximum number of retries for transient errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for RigettiConfig {
    fn default() -> Self {
        Self {
            name: default_rigetti_name(),
            enabled: true,
            endpoint: default_rigetti_endpoint(),
            api_token: None,
            device: default_rigetti_device(),
            hardware: false,
            num_qubits: default_rigetti_qubits(),
            gate_noise: None,
            measurement_noise: None,
            timeout_sec: default_rigetti_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

fn default_rigetti_name() -> String {
    "rigetti_qvm".into()
}

fn default_rigetti_endpoint() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_rigetti_device() -> String {
    "qvm".into()
}

fn default_rigetti_qubits() -> u32 {
    8
}

fn default_rigetti_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

/// Quantum beats sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Larmor frequency in rad/ns; λ = larmor_frequency · t
    #[serde(default = "default_larmor_frequency")]
    pub larmor_frequency: f64,

    /// Number of time steps (t = 0..time_steps, in ns)
    #[serde(default = "default_time_steps")]
    pub time_steps: u32,

    /// Backends to run at every step
    #[serde(default = "default_runs")]
    pub runs: Vec<RunSpec>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            larmor_frequency: default_larmor_frequency(),
            time_steps: default_time_steps(),
            runs: default_runs(),
        }
    }
}

impl ExperimentConfig {
    /// Phase accumulated by step `t`.
    pub fn lambda(&self, step: u32) -> f64 {
        self.larmor_frequency * step as f64
    }
}

fn default_larmor_frequency() -> f64 {
    // 4.6e8 1/s
    0.46
}

fn default_time_steps() -> u32 {
    30
}

fn default_runs() -> Vec<RunSpec> {
    vec![RunSpec {
        backend: default_rigetti_name(),
        trials: default_trials(),
        repeats: default_repeats(),
    }]
}

/// One backend's share of each time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Registered backend name
    pub backend: String,

    /// Trials per batch
    #[serde(default = "default_trials")]
    pub trials: u32,

    /// Batches per step
    #[serde(default = "default_repeats")]
    pub repeats: u32,
}

fn default_trials() -> u32 {
    1024
}

fn default_repeats() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Strict validation mode
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: true,
            limits: ResourceLimits::default(),
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum qubits per circuit
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Maximum trials per batch
    #[serde(default = "default_max_trials")]
    pub max_trials: u32,

    /// Maximum batches per step
    #[serde(default = "default_max_repeats")]
    pub max_repeats: u32,

    /// Maximum time steps per sweep
    #[serde(default = "default_max_time_steps")]
    pub max_time_steps: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_trials: default_max_trials(),
            max_repeats: default_max_repeats(),
            max_time_steps: default_max_time_steps(),
        }
    }
}

fn default_max_qubits() -> u32 {
    32
}

fn default_max_trials() -> u32 {
    100_000
}

fn default_max_repeats() -> u32 {
    100
}

fn default_max_time_steps() -> u32 {
    10_000
}
