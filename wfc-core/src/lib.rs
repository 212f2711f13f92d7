//! Core library for the tile-based Wave Function Collapse engine.
//! Defines the per-cell domains, constraint propagation, cell selection and
//! the generation loop.

use propagator::PropagationError;
use std::time::Duration;
use thiserror::Error;
use wfc_rules::TileSetError;

/// Per-cell superposition of candidate tiles.
pub mod cell;
/// Assembling the final bitmap from a collapsed grid.
pub mod compose;
/// Least-constrained cell selection.
pub mod entropy;
/// Generic 2D grid storage and the possibility grid.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;

/// The core WFC algorithm runner.
pub mod runner;

pub use crate::cell::Cell;
pub use crate::compose::compose_image;
pub use crate::entropy::{CpuEntropyCalculator, EntropyCalculator, SelectionStrategy};
pub use crate::grid::{EntropyGrid, Grid, PossibilityGrid};
pub use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator};
pub use crate::runner::{run, RunSummary, WfcConfig};

/// Errors that can occur during the Wave Function Collapse algorithm.
#[derive(Error, Debug)]
pub enum WfcError {
    /// A cell was left with no possible tiles. Includes the (x, y)
    /// coordinates of the contradictory cell.
    #[error("Contradiction: no tile fits at ({0}, {1})")]
    Contradiction(usize, usize),
    /// An error occurred during the constraint propagation phase.
    #[error("Propagation error: {0}")]
    Propagation(PropagationError),
    /// An error related to grid dimensions or accessing grid data.
    #[error("Grid error: {0}")]
    GridError(String),
    /// The grid still holds cells with more than one candidate.
    #[error("Grid is not fully collapsed")]
    IncompleteCollapse,
    /// WFC exceeded the configured maximum number of iterations.
    #[error("Maximum iterations ({0}) reached")]
    MaxIterationsReached(u64),
    /// WFC run was interrupted by an external signal (e.g., Ctrl+C).
    #[error("WFC run interrupted by signal")]
    Interrupted,
    /// The tile catalog cannot be used for the requested operation.
    #[error("TileSet configuration error: {0}")]
    TileSetError(#[from] TileSetError),
}

impl WfcError {
    /// True for the contradiction failure mode, after which a caller may
    /// restart generation from scratch.
    pub const fn is_contradiction(&self) -> bool {
        matches!(
            self,
            Self::Contradiction(..) | Self::Propagation(PropagationError::Contradiction(..))
        )
    }
}

impl From<PropagationError> for WfcError {
    fn from(error: PropagationError) -> Self {
        match error {
            PropagationError::Contradiction(x, y) => Self::Contradiction(x, y),
            other => Self::Propagation(other),
        }
    }
}

/// Information about the current state of the WFC algorithm execution.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// The total number of cells that have been collapsed.
    pub collapsed_cells: usize,
    /// The total number of cells in the grid.
    pub total_cells: usize,
    /// Time elapsed since the WFC run started.
    pub elapsed_time: Duration,
    /// The number of iterations completed so far.
    pub iterations: u64,
}

/// Defines different boundary handling strategies for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryMode {
    /// Grid boundaries act as hard walls; cells on the edge have no neighbour
    /// past it.
    #[default]
    Clamped,
    /// Edges wrap around (toroidal topology).
    Periodic,
}
