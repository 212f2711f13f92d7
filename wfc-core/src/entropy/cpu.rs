use crate::entropy::{EntropyCalculator, SelectionStrategy};
use crate::grid::{EntropyGrid, Grid, PossibilityGrid};
use crate::Cell;
use rand::seq::SliceRandom;
use rand::RngCore;

/// CPU implementation of the minimum-remaining-values heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEntropyCalculator {
    strategy: SelectionStrategy,
}

impl CpuEntropyCalculator {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }
}

impl EntropyCalculator for CpuEntropyCalculator {
    fn calculate_entropy(&self, grid: &PossibilityGrid) -> EntropyGrid {
        let cells = grid.cells();
        let sizes = cells.data.iter().map(Cell::domain_size).collect();
        Grid {
            width: cells.width,
            height: cells.height,
            data: sizes,
        }
    }

    fn select_lowest_entropy_cell(
        &self,
        entropy_grid: &EntropyGrid,
        rng: &mut dyn RngCore,
    ) -> Option<(usize, usize)> {
        // Collapsed (1) and contradictory (0) cells are never candidates.
        let min_entropy = entropy_grid
            .iter()
            .map(|(_, _, &size)| size)
            .filter(|&size| size > 1)
            .min()?;

        let mut lowest = entropy_grid
            .iter()
            .filter(|&(_, _, &size)| size == min_entropy)
            .map(|(x, y, _)| (x, y));

        match self.strategy {
            SelectionStrategy::FirstMinimum => lowest.next(),
            SelectionStrategy::RandomMinimum => {
                let candidates: Vec<_> = lowest.collect();
                candidates.choose(rng).copied()
            }
        }
    }
}
