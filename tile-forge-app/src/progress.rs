//! Progress reporting for generation runs.

use crate::config::ProgressLogLevel;
use anyhow::Result;
use log::Level;
use std::time::{Duration, Instant};
use wfc_core::{ProgressInfo, WfcError};

/// Trait for reporting the progress of the WFC algorithm.
///
/// Implementors of this trait can display progress information in various ways
/// (e.g., log output, a status line).
pub trait ProgressReporter: Send + Sync {
    /// Called after each iteration with updated progress information.
    ///
    /// # Arguments
    ///
    /// * `info` - The latest `ProgressInfo` snapshot from the WFC runner.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the WFC process completes successfully.
    fn finish(&mut self) -> Result<()>;

    /// Called when the WFC process fails with an error.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// A `ProgressReporter` that emits throttled log records.
pub struct LogProgressReporter {
    start_time: Instant,
    last_report_time: Option<Instant>,
    report_interval: Duration,
    level: Level,
    reports: u64,
}

impl LogProgressReporter {
    /// Creates a reporter that logs at most once per `report_interval`.
    pub fn new(report_interval: Duration, level: ProgressLogLevel) -> Self {
        let level = match level {
            ProgressLogLevel::Trace => Level::Trace,
            ProgressLogLevel::Debug => Level::Debug,
            ProgressLogLevel::Info => Level::Info,
            ProgressLogLevel::Warn => Level::Warn,
        };
        Self {
            start_time: Instant::now(),
            last_report_time: None,
            report_interval,
            level,
            reports: 0,
        }
    }

    /// Number of progress lines emitted so far.
    pub fn reports(&self) -> u64 {
        self.reports
    }

    fn format_duration(duration: Duration) -> String {
        format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let now = Instant::now();
        let due = self
            .last_report_time
            .map_or(true, |last| now.duration_since(last) >= self.report_interval);
        if !due {
            return Ok(());
        }

        let percentage = if info.total_cells > 0 {
            (info.collapsed_cells as f32 / info.total_cells as f32) * 100.0
        } else {
            100.0
        };
        log::log!(
            self.level,
            "Progress: Iter: {} | Collapsed: {}/{} ({:.1}%) | Elapsed: {}",
            info.iterations,
            info.collapsed_cells,
            info.total_cells,
            percentage,
            Self::format_duration(info.elapsed_time)
        );
        self.last_report_time = Some(now);
        self.reports += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            "Generation finished. Total time: {}",
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        log::warn!(
            "Generation attempt failed: {error}. Total time: {}",
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }
}
