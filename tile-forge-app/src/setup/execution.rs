//! Handles the core execution logic: load, generate with restarts, write.

use crate::{
    config::{Settings, VisualizationMode},
    error::AppError,
    output,
    progress::{LogProgressReporter, ProgressReporter},
    setup::job::GenerationJob,
    visualization::{TerminalVisualizer, Visualizer},
};
use log::{error, info, warn};
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use wfc_core::{
    compose_image, run, runner::ProgressCallback, CpuConstraintPropagator, CpuEntropyCalculator,
    PossibilityGrid, ProgressInfo, RunSummary, WfcConfig, WfcError,
};
use wfc_rules::{loader::load_tileset, LoadError, TileCatalog};

/// A successful generation.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub grid: PossibilityGrid,
    pub summary: RunSummary,
    /// 1-based attempt that succeeded.
    pub attempt: u32,
}

/// Loads the job's tileset and checks its bitmaps share one size.
pub fn load_catalog(job: &GenerationJob) -> Result<Arc<TileCatalog>, AppError> {
    let catalog = load_tileset(&job.tileset_dir, &job.extension)?;
    let (tile_width, tile_height) = catalog.tile_dimensions().map_err(LoadError::from)?;
    info!(
        "Tileset '{}': {} tiles of {tile_width}x{tile_height} pixels",
        job.tileset,
        catalog.len()
    );
    Ok(Arc::new(catalog))
}

fn progress_callback(settings: &Settings) -> Result<Option<ProgressCallback>, AppError> {
    let Some(interval) = settings.progress_interval()? else {
        return Ok(None);
    };
    let reporter = Mutex::new(LogProgressReporter::new(
        interval,
        settings.progress_log_level,
    ));
    Ok(Some(Box::new(move |info: ProgressInfo| -> Result<(), WfcError> {
        if let Ok(mut reporter) = reporter.lock() {
            if let Err(e) = reporter.report(&info) {
                warn!("Progress reporting failed: {e}");
            }
        }
        Ok(())
    })))
}

/// Runs generation on a fresh grid, restarting from scratch after each
/// contradiction until `settings.max_attempts` runs have failed.
///
/// Attempt `n` (0-based) is seeded with `seed + n` when a seed is
/// configured.
pub fn generate(
    settings: &Settings,
    job: &GenerationJob,
    catalog: &Arc<TileCatalog>,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<GenerationOutcome, AppError> {
    let mut reporter = LogProgressReporter::new(
        settings.progress_interval()?.unwrap_or_default(),
        settings.progress_log_level,
    );
    let mut last_error = None;

    for attempt in 0..settings.max_attempts {
        if shutdown_signal.load(Ordering::Relaxed) {
            return Err(WfcError::Interrupted.into());
        }
        let mut builder = WfcConfig::builder().shutdown_signal(Arc::clone(shutdown_signal));
        if let Some(seed) = settings.seed {
            builder = builder.seed(seed.wrapping_add(u64::from(attempt)));
        }
        if let Some(callback) = progress_callback(settings)? {
            builder = builder.progress_callback(callback);
        }
        let config = builder.build();

        let mut grid = PossibilityGrid::try_with_boundary(
            job.width,
            job.height,
            Arc::clone(catalog),
            settings.boundary.into(),
        )?;
        let result = run(
            &mut grid,
            Box::new(CpuConstraintPropagator::new()),
            Box::new(CpuEntropyCalculator::new(settings.selection.into())),
            &config,
        );

        match result {
            Ok(summary) => {
                reporter.finish()?;
                info!(
                    "Attempt {}/{} succeeded with seed {} after {} iterations",
                    attempt + 1,
                    settings.max_attempts,
                    summary.seed,
                    summary.iterations
                );
                return Ok(GenerationOutcome {
                    grid,
                    summary,
                    attempt: attempt + 1,
                });
            }
            Err(e) if e.is_contradiction() => {
                reporter.fail(&e)?;
                warn!(
                    "Attempt {}/{} hit a contradiction; restarting",
                    attempt + 1,
                    settings.max_attempts
                );
                last_error = Some(e);
            }
            Err(e) => {
                error!("Generation failed: {e}");
                return Err(e.into());
            }
        }
    }

    error!(
        "Giving up after {} attempts ended in contradiction",
        settings.max_attempts
    );
    Err(last_error
        .map_or_else(|| AppError::Config("max_attempts must be at least 1".into()), AppError::from))
}

/// Generates the job and writes every configured output.
pub fn run_standard_mode(
    settings: &Settings,
    job: &GenerationJob,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<GenerationOutcome, AppError> {
    let catalog = load_catalog(job)?;
    let outcome = generate(settings, job, &catalog, shutdown_signal)?;

    let image = compose_image(&outcome.grid)?;
    output::save_image(&image, &settings.output_path)?;

    if let Some(path) = &settings.assignment_path {
        output::save_assignment(&outcome.grid, path)?;
    }

    match settings.visualization_mode {
        VisualizationMode::None => {}
        VisualizationMode::Terminal => {
            TerminalVisualizer::new(io::stdout().lock()).display_state(&outcome.grid)?;
        }
    }

    info!(
        "Wrote {} after {} attempt(s) in {:?}",
        settings.output_path.display(),
        outcome.attempt,
        outcome.summary.elapsed
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_tileset(dir: &Path, rules: &str, colors: &[(&str, [u8; 3])]) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("rules.csv"), rules).unwrap();
        for (name, color) in colors {
            RgbImage::from_pixel(2, 2, Rgb(*color))
                .save(dir.join(format!("{name}.png")))
                .unwrap();
        }
    }

    fn job(dir: &Path, width: usize, height: usize) -> GenerationJob {
        GenerationJob {
            tileset_dir: dir.to_path_buf(),
            tileset: "test".into(),
            extension: "png".into(),
            width,
            height,
        }
    }

    #[test]
    fn test_generate_and_write_outputs() {
        let root = tempdir().unwrap();
        let tiles = root.path().join("stripes");
        write_tileset(
            &tiles,
            "name,north,east,south,west\nred,r,x,r,x\nblue,b,x,b,x\n",
            &[("red", [255, 0, 0]), ("blue", [0, 0, 255])],
        );
        let settings = Settings {
            seed: Some(5),
            output_path: root.path().join("out.png"),
            assignment_path: Some(root.path().join("out.csv")),
            ..Settings::default()
        };

        let outcome =
            run_standard_mode(&settings, &job(&tiles, 3, 2), &Arc::new(AtomicBool::new(false)))
                .unwrap();
        assert!(outcome.grid.is_fully_collapsed());
        assert_eq!(outcome.attempt, 1);

        let image = image::open(&settings.output_path).unwrap();
        assert_eq!((image.width(), image.height()), (6, 4));
        let table = fs::read_to_string(root.path().join("out.csv")).unwrap();
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_contradiction_exhausts_attempts() {
        let root = tempdir().unwrap();
        let tiles = root.path().join("broken");
        // Nothing offers "z" on its west side, so any 2-wide grid fails.
        write_tileset(&tiles, "lonely,x,z,x,y\n", &[("lonely", [1, 2, 3])]);
        let settings = Settings {
            max_attempts: 3,
            seed: Some(1),
            ..Settings::default()
        };
        let job = job(&tiles, 2, 1);
        let catalog = load_catalog(&job).unwrap();

        let err = generate(&settings, &job, &catalog, &Arc::new(AtomicBool::new(false)))
            .unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_shutdown_before_start() {
        let root = tempdir().unwrap();
        let tiles = root.path().join("plain");
        write_tileset(&tiles, "a,x,x,x,x\n", &[("a", [9, 9, 9])]);
        let job = job(&tiles, 2, 2);
        let catalog = load_catalog(&job).unwrap();

        let err = generate(
            &Settings::default(),
            &job,
            &catalog,
            &Arc::new(AtomicBool::new(true)),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::WfcCore(WfcError::Interrupted)));
    }

    #[test]
    fn test_mismatched_tile_sizes_fail_fast() {
        let root = tempdir().unwrap();
        let tiles = root.path().join("uneven");
        write_tileset(&tiles, "a,x,x,x,x\nb,x,x,x,x\n", &[("a", [0, 0, 0])]);
        RgbImage::new(3, 2).save(tiles.join("b.png")).unwrap();
        assert!(matches!(
            load_catalog(&job(&tiles, 1, 1)),
            Err(AppError::Rules(LoadError::InvalidData(_)))
        ));
    }
}
