//! Resolving the tileset, bitmap extension and grid size for a run.

use crate::config::Settings;
use crate::error::AppError;
use crate::prompt::{normalize_extension, parse_dimensions, Prompter};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use wfc_rules::loader::list_tilesets;

/// What to generate: which tileset, read how, into how large a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Directory holding the tileset's rule table and bitmaps.
    pub tileset_dir: PathBuf,
    pub tileset: String,
    pub extension: String,
    pub width: usize,
    pub height: usize,
}

/// Completes `settings` into a job, prompting for anything missing or
/// invalid.
pub fn resolve_job<R: BufRead, W: Write>(
    settings: &Settings,
    prompter: &mut Prompter<R, W>,
) -> Result<GenerationJob, AppError> {
    let known = list_tilesets(&settings.tiles_dir)?;
    if known.is_empty() {
        return Err(AppError::Config(format!(
            "no tilesets found under {}",
            settings.tiles_dir.display()
        )));
    }

    let tileset = match settings.tileset.as_deref() {
        Some(name) if known.iter().any(|k| k == name) => name.to_owned(),
        Some(name) => {
            warn!("Unknown tileset '{name}'");
            prompter.tileset(&known)?
        }
        None => prompter.tileset(&known)?,
    };

    let extension = match settings.extension.as_deref().and_then(normalize_extension) {
        Some(extension) => extension,
        None => prompter.extension()?,
    };

    let (width, height) = match settings.dimensions.as_deref().map(parse_dimensions) {
        Some(Ok(dimensions)) => dimensions,
        Some(Err(message)) => {
            warn!("{message}");
            prompter.dimensions()?
        }
        None => prompter.dimensions()?,
    };

    let job = GenerationJob {
        tileset_dir: settings.tiles_dir.join(&tileset),
        tileset,
        extension,
        width,
        height,
    };
    info!(
        "Generating {}x{} grid from tileset '{}' (*.{})",
        job.width, job.height, job.tileset, job.extension
    );
    Ok(job)
}
