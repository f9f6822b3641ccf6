// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum backend implementations.
//!
//! This module provides the [`QuantumBackend`] trait and implementations for
//! the vendors the experiment runs on:
//!
//! - `ibm::IbmBackend`: IBM Quantum devices and hosted simulators
//! - `rigetti::RigettiBackend`: Rigetti QVM (ideal or noisy) and QPUs

pub mod ibm;
pub mod registry;
pub mod rigetti;
pub mod r#trait;

pub use r#trait::{BackendInfo, BackendType, HealthStatus, QuantumBackend};
pub use registry::BackendRegistry;
