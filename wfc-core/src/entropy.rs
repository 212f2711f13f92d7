use crate::grid::{EntropyGrid, PossibilityGrid};
use rand::RngCore;
use std::fmt::Debug;

pub mod cpu;
pub use cpu::CpuEntropyCalculator;

/// How to break ties between equally constrained cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionStrategy {
    /// The first minimal cell in row-major order (y outer, x inner).
    #[default]
    FirstMinimum,
    /// A uniformly random cell among all minimal ones.
    RandomMinimum,
}

/// Chooses which cell to collapse next.
///
/// The "entropy" of a cell is its domain size: fewer candidates means less
/// branching and a lower risk of contradiction.
pub trait EntropyCalculator: Debug {
    /// Computes the domain size of every cell.
    #[must_use]
    fn calculate_entropy(&self, grid: &PossibilityGrid) -> EntropyGrid;

    /// Returns the coordinates of an uncollapsed cell (domain size > 1) whose
    /// domain size is minimal, or `None` if there is no such cell.
    fn select_lowest_entropy_cell(
        &self,
        entropy_grid: &EntropyGrid,
        rng: &mut dyn RngCore,
    ) -> Option<(usize, usize)>;
}
