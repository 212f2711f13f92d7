use crate::{
    entropy::EntropyCalculator, propagator::ConstraintPropagator, PossibilityGrid, ProgressInfo,
    WfcError,
};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Alias for the progress callback function type.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) -> Result<(), WfcError> + Send + Sync>;

/// Configuration options for the WFC runner.
pub struct WfcConfig {
    pub progress_callback: Option<ProgressCallback>,
    pub shutdown_signal: Arc<AtomicBool>,
    pub max_iterations: Option<u64>,
    pub seed: Option<u64>,
}

impl WfcConfig {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder {
        WfcConfigBuilder::default()
    }
}

impl Default for WfcConfig {
    fn default() -> Self {
        Self {
            progress_callback: None,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
            max_iterations: None,
            seed: None,
        }
    }
}

/// Builder for `WfcConfig`.
///
/// Allows for a more ergonomic construction of `WfcConfig` instances.
#[derive(Default)]
pub struct WfcConfigBuilder {
    progress_callback: Option<ProgressCallback>,
    shutdown_signal: Option<Arc<AtomicBool>>, // Optional, default is created if None
    max_iterations: Option<u64>,
    seed: Option<u64>,
}

impl WfcConfigBuilder {
    /// Sets the progress callback function.
    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Provides an external shutdown signal.
    /// If not provided, a new signal will be created.
    pub fn shutdown_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Sets the maximum number of iterations allowed.
    pub fn max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig {
        WfcConfig {
            progress_callback: self.progress_callback,
            shutdown_signal: self
                .shutdown_signal
                .unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            max_iterations: self.max_iterations,
            seed: self.seed,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of select/collapse/propagate iterations performed.
    pub iterations: u64,
    /// The seed the random source was created from.
    pub seed: u64,
    pub elapsed: Duration,
}

/// Runs the core Wave Function Collapse (WFC) loop.
///
/// This function orchestrates the WFC process:
/// 1. **Initialization**: Checks the initial grid state for contradictions and runs initial
///    propagation.
/// 2. **Observation**: Repeatedly selects the uncollapsed cell with the fewest candidates.
/// 3. **Collapse**: Collapses the selected cell to one of its candidates, chosen uniformly.
/// 4. **Propagation**: Propagates the consequences of the collapse through the grid using the
///    `ConstraintPropagator` until no domain changes.
/// 5. **Termination**: Stops when all cells are collapsed (success) or a contradiction occurs
///    (failure).
///
/// # Arguments
///
/// * `grid`: The `PossibilityGrid` to fill. It is modified in place.
/// * `propagator`: The chosen `ConstraintPropagator` implementation.
/// * `entropy_calculator`: The chosen `EntropyCalculator` implementation.
/// * `config`: Configuration settings for the run (`WfcConfig`).
///
/// # Returns
///
/// * `Ok(RunSummary)` if every cell ends with exactly one tile.
/// * `Err(WfcError)` if an error occurs, such as:
///     * `WfcError::Contradiction`: A cell reaches a state where no tiles are possible.
///     * `WfcError::MaxIterationsReached`: The iteration limit was exceeded.
///     * `WfcError::Interrupted`: The shutdown signal was raised.
pub fn run(
    grid: &mut PossibilityGrid,
    mut propagator: Box<dyn ConstraintPropagator>,
    entropy_calculator: Box<dyn EntropyCalculator>,
    config: &WfcConfig,
) -> Result<RunSummary, WfcError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(
        "Starting WFC run on {}x{} grid with {} tiles (seed {seed})",
        grid.width(),
        grid.height(),
        grid.num_tiles()
    );
    let start_time = Instant::now();
    let total_cells = grid.width() * grid.height();
    let mut iterations = 0;

    if let Some((x, y)) = grid.find_contradiction() {
        error!("Initial contradiction found at ({x}, {y})");
        return Err(WfcError::Contradiction(x, y));
    }

    // Tiles with no possible partner on some side are pruned before the first
    // collapse.
    let all_coords: Vec<(usize, usize)> = (0..grid.height())
        .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
        .collect();
    debug!("Running initial propagation for all {} cells...", all_coords.len());
    if let Err(prop_err) = propagator.propagate(grid, all_coords) {
        error!("Initial propagation failed: {prop_err}");
        return Err(WfcError::from(prop_err));
    }

    let iteration_limit = config
        .max_iterations
        .unwrap_or((total_cells as u64).saturating_add(1));
    debug!("WFC run iteration limit set to: {iteration_limit}");

    let report = |iterations: u64, grid: &PossibilityGrid| -> Result<(), WfcError> {
        if let Some(ref callback) = config.progress_callback {
            callback(ProgressInfo {
                collapsed_cells: grid.collapsed_count(),
                total_cells,
                elapsed_time: start_time.elapsed(),
                iterations,
            })?;
        }
        Ok(())
    };

    loop {
        if config.shutdown_signal.load(Ordering::Relaxed) {
            warn!("Shutdown signal received, stopping WFC run prematurely.");
            return Err(WfcError::Interrupted);
        }

        if grid.is_fully_collapsed() {
            info!("All cells collapsed.");
            report(iterations, grid)?;
            break;
        }

        if iterations >= iteration_limit {
            error!("Maximum iterations ({iteration_limit}) exceeded.");
            return Err(WfcError::MaxIterationsReached(iteration_limit));
        }
        iterations += 1;

        match perform_iteration(
            grid,
            propagator.as_mut(),
            entropy_calculator.as_ref(),
            &mut rng,
            iterations,
        )? {
            Some(_) => report(iterations, grid)?,
            None => {
                // Nothing left to choose yet not fully collapsed: some cell
                // must be empty.
                let err = grid
                    .find_contradiction()
                    .map_or(WfcError::IncompleteCollapse, |(x, y)| {
                        WfcError::Contradiction(x, y)
                    });
                error!("Iter {iterations}: {err}");
                return Err(err);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!("WFC run finished in {elapsed:?} after {iterations} iterations.");
    Ok(RunSummary {
        iterations,
        seed,
        elapsed,
    })
}

/// Performs a single iteration of the WFC algorithm: observe, collapse, propagate.
fn perform_iteration(
    grid: &mut PossibilityGrid,
    propagator: &mut dyn ConstraintPropagator,
    entropy_calculator: &dyn EntropyCalculator,
    rng: &mut StdRng,
    iteration: u64,
) -> Result<Option<(usize, usize)>, WfcError> {
    let entropy_grid = entropy_calculator.calculate_entropy(grid);
    let Some((x, y)) = entropy_calculator.select_lowest_entropy_cell(&entropy_grid, rng) else {
        return Ok(None);
    };

    let candidates = entropy_grid.get(x, y).copied().unwrap_or_default();
    let tile = grid.observe_cell(x, y, rng)?;
    debug!(
        "Iter {iteration}: Collapsing cell ({x}, {y}) to tile {} (1 of {candidates})",
        grid.catalog().get(tile).map_or("?", |t| t.name.as_str())
    );

    propagator.propagate(grid, vec![(x, y)])?;
    Ok(Some((x, y)))
}
