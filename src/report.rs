// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! CSV output of sweep results.
//!
//! [`SummaryWriter`] emits one row per time step with the mean and standard
//! deviation of every beats outcome per run. [`RawTableWriter`] emits the
//! per-batch counts behind those numbers. Both flush after every step so a
//! long sweep can be followed while it runs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::circuit::BeatsOutcome;
use crate::error::Result;
use crate::experiment::{RunSummary, StepReport};

/// Step-by-step summary table.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl SummaryWriter<File> {
    /// Create (or truncate) a summary file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(inner),
            header_written: false,
        }
    }

    /// Write one step. The header is derived from the first step's runs.
    pub fn write_step(&mut self, report: &StepReport) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(summary_header(&report.runs))?;
            self.header_written = true;
        }

        let mut row = vec![report.step.to_string(), report.lambda.to_string()];
        for run in &report.runs {
            for outcome in BeatsOutcome::ALL {
                match run.summary(outcome) {
                    Some(s) => {
                        row.push(s.mean.to_string());
                        row.push(s.std_dev.to_string());
                    }
                    None => row.extend([String::new(), String::new()]),
                }
            }
        }

        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

fn summary_header(runs: &[RunSummary]) -> Vec<String> {
    let mut header = vec!["step".to_string(), "lambda".to_string()];
    for run in runs {
        for outcome in BeatsOutcome::ALL {
            header.push(format!("{} {} mean", run.backend, outcome.label()));
            header.push(format!("{} {} std", run.backend, outcome.label()));
        }
    }
    header
}

/// Per-batch counts, one row per step, run and outcome.
pub struct RawTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RawTableWriter<File> {
    /// Create (or truncate) a raw table file.
    pub fn create(path: &Path) -> Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> RawTableWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(["step", "backend", "outcome", "counts"])?;
        Ok(Self { writer })
    }

    pub fn write_step(&mut self, report: &StepReport) -> Result<()> {
        for run in &report.runs {
            for (outcome, summary) in &run.outcomes {
                let counts = summary
                    .samples
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(";");
                self.writer.write_record([
                    report.step.to_string(),
                    run.backend.clone(),
                    outcome.label().to_string(),
                    counts,
                ])?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
