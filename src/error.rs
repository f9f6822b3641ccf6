// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for experiments, backends and measurement aggregation.

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Backend-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend not found
    #[error("Backend not found: {0}")]
    NotFound(String),
    /// Backend unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    /// Execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Timeout
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
    /// Result payload could not be turned into outcome records
    #[error("Invalid result: {0}")]
    InvalidResult(String),
}

/// Validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field validation failed
    #[error("Field '{field}': {message}")]
    Field { field: String, message: String },
    /// A measured value was neither 0 nor 1
    #[error("Invalid bit value {value} at position {position}")]
    InvalidBit { position: usize, value: i64 },
    /// A record in a batch does not match the width of the first record
    #[error("Record {index} has {actual} bits, expected {expected}")]
    InconsistentRecordLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Resource limit exceeded
    #[error("Resource limit exceeded for {resource}: limit={limit}, requested={requested}")]
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}
