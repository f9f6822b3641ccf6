// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Summary of an outcome count across repeated batches.

use serde::Serialize;

/// Mean and spread of one outcome's count over repeated batches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Per-batch counts, in execution order
    pub samples: Vec<u64>,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divides by n)
    pub std_dev: f64,
}

impl BatchSummary {
    /// Summarize per-batch counts. Returns `None` for an empty slice.
    pub fn from_counts(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().map(|&c| c as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Some(Self {
            samples: samples.to_vec(),
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Number of batches summarized.
    pub fn batches(&self) -> usize {
        self.samples.len()
    }
}
