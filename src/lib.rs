// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum beats experiment toolkit
//!
//! This crate runs the two-qubit quantum beats circuit on remote quantum
//! backends and reduces the measured outcomes to frequency tables.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CLI (clap) / CSV reports          │
//! ├─────────────────────────────────────────┤
//! │    QuantumBeatsExperiment (time sweep)   │
//! ├──────────────────┬──────────────────────┤
//! │  Circuit builder │  compute_distribution│
//! ├──────────────────┴──────────────────────┤
//! │           Backend Registry               │
//! ├────────────────┬────────────────────────┤
//! │  IBM Backend   │   Rigetti Backend      │
//! │  (reqwest)     │   (reqwest, QVM)       │
//! └────────────────┴────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`distribution`]: Outcome records and frequency tables
//! - [`circuit`]: Quantum beats circuit and its QASM/Quil renderings
//! - [`backend`]: Quantum backend trait and implementations
//! - [`experiment`]: Time sweep over configured backends
//! - [`stats`]: Mean and spread across repeated batches
//! - [`report`]: CSV output
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod backend;
pub mod circuit;
pub mod config;
pub mod distribution;
pub mod error;
pub mod experiment;
pub mod report;
pub mod stats;
pub mod validation;

pub use config::Config;
pub use distribution::{compute_distribution, DistributionTable, OutcomeRecord};
pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
