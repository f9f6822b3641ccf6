// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Backend registry for managing quantum backends.
//!
//! The registry is the availability list of the experiment: a run naming a
//! backend that is not registered fails with [`BackendError::NotFound`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info, warn};

use super::ibm::IbmBackend;
use super::rigetti::RigettiBackend;
use super::{BackendType, QuantumBackend};
use crate::config::{BackendsConfig, ResourceLimits};
use crate::error::{BackendError, Error, Result};

/// Backend registry for managing quantum backends.
///
/// The registry is thread-safe and can be shared across async tasks.
///
/// # Example
///
/// ```ignore
/// use quantum_beats::backend::BackendRegistry;
/// use quantum_beats::config::Config;
///
/// let config = Config::default();
/// let registry = BackendRegistry::from_config(&config.backends, config.validation.limits.clone());
/// let backend = registry.get("rigetti_qvm")?;
/// ```
pub struct BackendRegistry {
    /// Registered backends
    backends: RwLock<HashMap<String, Arc<dyn QuantumBackend>>>,

    /// Global resource limits
    limits: ResourceLimits,
}

impl BackendRegistry {
    /// Create a registry with specific resource limits.
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// Create a registry holding every enabled backend in `config`.
    ///
    /// Backends that fail to initialize are logged and skipped.
    pub fn from_config(config: &BackendsConfig, limits: ResourceLimits) -> Self {
        let registry = Self::with_limits(limits);

        for ibm in config.ibm.iter().filter(|b| b.enabled) {
            match IbmBackend::from_config(ibm) {
                Ok(backend) => registry.register(Arc::new(backend)),
                Err(e) => error!(backend = %ibm.name, error = %e, "Failed to initialize IBM backend"),
            }
        }

        for rigetti in config.rigetti.iter().filter(|b| b.enabled) {
            match RigettiBackend::from_config(rigetti) {
                Ok(backend) => registry.register(Arc::new(backend)),
                Err(e) => {
                    error!(backend = %rigetti.name, error = %e, "Failed to initialize Rigetti backend")
                }
            }
        }

        registry
    }

    /// Register a backend.
    ///
    /// If a backend with the same name already exists, it will be replaced.
    pub fn register(&self, backend: Arc<dyn QuantumBackend>) {
        let name = backend.name().to_string();
        info!(backend = %name, backend_type = %backend.backend_type(), "Registering backend");

        let mut backends = self.backends.write();
        if backends.insert(name.clone(), backend).is_some() {
            warn!(backend = %name, "Replaced previously registered backend");
        }
    }

    /// Get a backend by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn QuantumBackend>> {
        let backends = self.backends.read();
        backends
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Backend(BackendError::NotFound(name.to_string())))
    }

    /// Check that every name is registered, failing on the first missing one.
    pub fn require_all<'a, I>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let backends = self.backends.read();
        for name in names {
            if !backends.contains_key(name) {
                return Err(Error::Backend(BackendError::NotFound(format!(
                    "'{}' is not among the available backends",
                    name
                ))));
            }
        }
        Ok(())
    }

    /// List all registered backend names, sorted.
    pub fn list(&self) -> Vec<String> {
        let backends = self.backends.read();
        let mut names: Vec<String> = backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all backends with their types, sorted by name.
    pub fn list_with_types(&self) -> Vec<(String, BackendType)> {
        let backends = self.backends.read();
        let mut entries: Vec<(String, BackendType)> = backends
            .iter()
            .map(|(name, backend)| (name.clone(), backend.backend_type()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Check if a backend is registered.
    pub fn contains(&self, name: &str) -> bool {
        let backends = self.backends.read();
        backends.contains_key(name)
    }

    /// Get the number of registered backends.
    pub fn len(&self) -> usize {
        let backends = self.backends.read();
        backends.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the global resource limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_limits(ResourceLimits::default())
    }
}
