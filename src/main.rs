// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum beats command line
//!
//! # Usage
//!
//! ```bash
//! # Run the default sweep against a local QVM, summary on stdout
//! quantum-beats run
//!
//! # Shorter sweep, summary and raw counts to files
//! quantum-beats run --steps 10 --output beats.csv --raw-output raw.csv
//!
//! # Check backend health
//! quantum-beats health
//!
//! # List available backends
//! quantum-beats backends
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quantum_beats::backend::{BackendRegistry, HealthStatus};
use quantum_beats::config::Config;
use quantum_beats::experiment::QuantumBeatsExperiment;
use quantum_beats::report::{RawTableWriter, SummaryWriter};
use quantum_beats::{Error, Result, VERSION};

/// Quantum beats experiment runner
#[derive(Parser)]
#[command(name = "quantum-beats")]
#[command(author = "Quantum Beats Contributors")]
#[command(version = VERSION)]
#[command(about = "Sweep the quantum beats circuit over IBM and Rigetti backends")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "QUANTUM_BEATS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the time sweep
    Run {
        /// Number of time steps
        #[arg(long)]
        steps: Option<u32>,

        /// Larmor frequency (rad/ns)
        #[arg(long)]
        larmor: Option<f64>,

        /// Summary CSV path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-batch counts CSV path
        #[arg(long)]
        raw_output: Option<PathBuf>,
    },

    /// Check backend health
    Health {
        /// Specific backend to check
        #[arg(short, long)]
        backend: Option<String>,
    },

    /// List available backends
    Backends,

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Run {
            steps,
            larmor,
            output,
            raw_output,
        } => {
            if let Some(steps) = steps {
                config.experiment.time_steps = steps;
            }
            if let Some(larmor) = larmor {
                config.experiment.larmor_frequency = larmor;
            }

            config.validate()?;

            let registry = Arc::new(initialize_backends(&config)?);

            info!(
                version = VERSION,
                steps = config.experiment.time_steps,
                backends = ?registry.list(),
                "Starting quantum beats run"
            );

            let mut summary: SummaryWriter<Box<dyn io::Write>> = match &output {
                Some(path) => SummaryWriter::new(Box::new(std::fs::File::create(path)?)),
                None => SummaryWriter::new(Box::new(io::stdout())),
            };
            let mut raw = raw_output
                .as_deref()
                .map(RawTableWriter::<std::fs::File>::create)
                .transpose()?;

            let experiment = QuantumBeatsExperiment::new(config.experiment.clone(), registry)
                .with_strict_limits(config.validation.strict);
            experiment
                .run(|report| {
                    summary.write_step(report)?;
                    if let Some(raw) = raw.as_mut() {
                        raw.write_step(report)?;
                    }
                    Ok(())
                })
                .await?;

            summary.into_inner()?;
            if let Some(raw) = raw {
                raw.into_inner()?;
            }
        }

        Commands::Health { backend } => {
            let registry = Arc::new(initialize_backends(&config)?);

            if let Some(name) = backend {
                match registry.get(&name) {
                    Ok(b) => match b.health_check().await {
                        Ok(status) => {
                            println!("{}: {:?}", name, status);
                            if status != HealthStatus::Healthy {
                                std::process::exit(1);
                            }
                        }
                        Err(e) => {
                            eprintln!("{}: Error - {}", name, e);
                            std::process::exit(1);
                        }
                    },
                    Err(e) => {
                        eprintln!("Backend not found: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                let mut all_healthy = true;
                for name in registry.list() {
                    if let Ok(b) = registry.get(&name) {
                        match b.health_check().await {
                            Ok(status) => {
                                println!("{}: {:?}", name, status);
                                if status != HealthStatus::Healthy {
                                    all_healthy = false;
                                }
                            }
                            Err(e) => {
                                println!("{}: Error - {}", name, e);
                                all_healthy = false;
                            }
                        }
                    }
                }

                if !all_healthy {
                    std::process::exit(1);
                }
            }
        }

        Commands::Backends => {
            let registry = Arc::new(initialize_backends(&config)?);

            println!("Available backends:");
            for (name, backend_type) in registry.list_with_types() {
                let backend = registry.get(&name)?;
                match backend.get_info().await {
                    Ok(info) => println!(
                        "  {} [{}] {}/{}, {} qubits",
                        name, backend_type, info.vendor, info.device, info.num_qubits
                    ),
                    Err(e) => println!("  {} [{}] info unavailable: {}", name, backend_type, e),
                }
            }
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config.redacted())?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr; stdout carries CSV.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}

/// Build the registry from configuration.
fn initialize_backends(config: &Config) -> Result<BackendRegistry> {
    let registry =
        BackendRegistry::from_config(&config.backends, config.validation.limits.clone());

    if registry.is_empty() {
        error!("No backends available. At least one backend must be enabled.");
        return Err(Error::Config(
            "No backends available. At least one backend must be enabled.".to_string(),
        ));
    }

    Ok(registry)
}
