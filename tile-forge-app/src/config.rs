//! Command-line arguments and layered run settings.
//!
//! Settings are merged from, in increasing priority: built-in defaults, a
//! TOML file, `TILE_FORGE_*` environment variables and command-line flags.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wfc_core::{BoundaryMode, SelectionStrategy};

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "TILE_FORGE_";

/// Settings taken verbatim from the environment, even when they look like
/// numbers (`TILE_FORGE_TILESET=2024`).
const TEXT_KEYS: [&str; 4] = ["tileset", "extension", "dimensions", "report_progress_interval"];

/// Represents the different visualization modes available.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    #[default] // Default to None
    None,
    /// Print the finished grid as coloured glyphs.
    Terminal,
}

/// How cells on the grid edge see their missing neighbours.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryChoice {
    #[default]
    Clamped,
    Periodic,
}

impl From<BoundaryChoice> for BoundaryMode {
    fn from(choice: BoundaryChoice) -> Self {
        match choice {
            BoundaryChoice::Clamped => Self::Clamped,
            BoundaryChoice::Periodic => Self::Periodic,
        }
    }
}

/// Tie-break among equally constrained cells.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionChoice {
    #[default]
    FirstMinimum,
    RandomMinimum,
}

impl From<SelectionChoice> for SelectionStrategy {
    fn from(choice: SelectionChoice) -> Self {
        match choice {
            SelectionChoice::FirstMinimum => Self::FirstMinimum,
            SelectionChoice::RandomMinimum => Self::RandomMinimum,
        }
    }
}

/// Log level for progress reports.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Log level for everything that is not a progress report.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Command-line arguments for Tile Forge.
///
/// Every setting flag is optional; an absent flag leaves the value from the
/// lower configuration layers in place.
#[derive(Parser, Serialize, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// TOML settings file. A missing file is ignored.
    #[arg(short, long, value_name = "FILE", default_value = "tile-forge.toml")]
    #[serde(skip)]
    pub config: PathBuf,

    /// Directory holding one sub-directory per tileset.
    #[arg(long, value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles_dir: Option<PathBuf>,

    /// Name of the tileset to generate from. Prompted for when absent.
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tileset: Option<String>,

    /// File extension of the tile bitmaps (e.g. "bmp", "png").
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Output grid size in cells, as "WIDTH,HEIGHT".
    #[arg(short, long, value_name = "W,H")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Path to save the composed image. The format follows the extension.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Optional path for a CSV table of the chosen tile names.
    #[arg(long, value_name = "CSV_FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_path: Option<PathBuf>,

    /// How many times to restart generation after a contradiction.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Edge handling for the grid.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryChoice>,

    /// Which of several equally constrained cells to collapse next.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionChoice>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_progress_interval: Option<String>,

    /// Choose the visualization mode.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_mode: Option<VisualizationMode>,

    /// Log level for everything except progress reports.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_log_level: Option<GlobalLogLevel>,

    /// Log level for progress reports.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_log_level: Option<ProgressLogLevel>,
}

/// Fully merged settings for one run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tiles_dir: PathBuf,
    pub tileset: Option<String>,
    pub extension: Option<String>,
    pub dimensions: Option<String>,
    pub seed: Option<u64>,
    pub output_path: PathBuf,
    pub assignment_path: Option<PathBuf>,
    pub max_attempts: u32,
    pub boundary: BoundaryChoice,
    pub selection: SelectionChoice,
    pub report_progress_interval: Option<String>,
    pub visualization_mode: VisualizationMode,
    pub global_log_level: GlobalLogLevel,
    pub progress_log_level: ProgressLogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tiles_dir: PathBuf::from("tiles"),
            tileset: None,
            extension: None,
            dimensions: None,
            seed: None,
            output_path: PathBuf::from("output.png"),
            assignment_path: None,
            max_attempts: 10,
            boundary: BoundaryChoice::default(),
            selection: SelectionChoice::default(),
            report_progress_interval: None,
            visualization_mode: VisualizationMode::default(),
            global_log_level: GlobalLogLevel::default(),
            progress_log_level: ProgressLogLevel::default(),
        }
    }
}

impl Settings {
    /// Merges all configuration layers for `cli` and validates the result.
    pub fn load(cli: &AppConfig) -> Result<Self, AppError> {
        let settings: Self = Self::figment(cli).extract()?;
        if settings.max_attempts == 0 {
            return Err(AppError::Config("max_attempts must be at least 1".into()));
        }
        settings.progress_interval()?;
        Ok(settings)
    }

    /// The layered configuration sources, lowest priority first.
    pub fn figment(cli: &AppConfig) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&cli.config))
            .merge(env_layer())
            .merge(Serialized::defaults(cli))
    }

    /// Parsed `report_progress_interval`, if set.
    pub fn progress_interval(&self) -> Result<Option<Duration>, AppError> {
        self.report_progress_interval
            .as_deref()
            .map(|text| {
                humantime::parse_duration(text).map_err(|e| {
                    AppError::Config(format!("Invalid report_progress_interval '{text}': {e}"))
                })
            })
            .transpose()
    }
}

/// `TILE_FORGE_*` variables. Text settings bypass figment's value parsing so
/// that numeric-looking names stay strings.
fn env_layer() -> Figment {
    let mut figment = Figment::from(Env::prefixed(ENV_PREFIX).ignore(&TEXT_KEYS));
    for key in TEXT_KEYS {
        let name = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Ok(value) = std::env::var(&name) {
            figment = figment.merge(Serialized::default(key, value));
        }
    }
    figment
}
