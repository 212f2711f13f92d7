//! Logging setup for the application.

use crate::config::{GlobalLogLevel, ProgressLogLevel, Settings};
use env_logger::{Builder, DEFAULT_FILTER_ENV, DEFAULT_WRITE_STYLE_ENV};
use log::LevelFilter;
use std::env;

/// Module path whose records carry progress reports.
pub const PROGRESS_MODULE: &str = "tile_forge_app::progress";

impl From<ProgressLogLevel> for LevelFilter {
    fn from(level: ProgressLogLevel) -> Self {
        match level {
            ProgressLogLevel::Trace => Self::Trace,
            ProgressLogLevel::Debug => Self::Debug,
            ProgressLogLevel::Info => Self::Info,
            ProgressLogLevel::Warn => Self::Warn,
        }
    }
}

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Builds the logger configuration for `settings` without installing it.
///
/// A non-empty `RUST_LOG` replaces the configured levels entirely. Otherwise
/// the global level applies to every module and the progress module gets its
/// own level.
pub fn logger_builder(settings: &Settings) -> Builder {
    let mut builder = builder_with_filters(settings, env::var(DEFAULT_FILTER_ENV).ok().as_deref());
    if let Ok(style) = env::var(DEFAULT_WRITE_STYLE_ENV) {
        builder.parse_write_style(&style);
    }
    builder
}

fn builder_with_filters(settings: &Settings, rust_log: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    match rust_log.filter(|filters| !filters.trim().is_empty()) {
        Some(filters) => {
            builder.parse_filters(filters);
        }
        None => {
            builder.filter_level(settings.global_log_level.into());
            builder.filter_module(PROGRESS_MODULE, settings.progress_log_level.into());
        }
    }
    builder
}

/// Initializes the global logger. Later calls are ignored.
pub fn init_logger(settings: &Settings) {
    if logger_builder(settings).try_init().is_err() {
        return;
    }
    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        settings.global_log_level,
        settings.progress_log_level
    );
}
