//! Tile Forge Application Library
//!
//! This crate contains the configuration, setup, prompts, output writers
//! and reporting for the Tile Forge command-line tool.

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod setup;
pub mod visualization;

pub use config::{AppConfig, Settings};
pub use error::AppError;

use clap::Parser;
use prompt::Prompter;
use setup::{execution::run_standard_mode, job::resolve_job};
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Runs the application with the process arguments, environment and
/// standard streams.
pub fn run() -> anyhow::Result<()> {
    let cli = AppConfig::parse();
    let settings = Settings::load(&cli)?;
    logging::init_logger(&settings);

    log::info!("Tile Forge starting");
    log::debug!("Loaded settings: {settings:?}");

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let job = resolve_job(&settings, &mut prompter)?;

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    run_standard_mode(&settings, &job, &shutdown_signal)?;

    log::info!("Tile Forge finished.");
    Ok(())
}
