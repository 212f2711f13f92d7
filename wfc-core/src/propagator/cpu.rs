use crate::{
    grid::PossibilityGrid,
    propagator::{ConstraintPropagator, PropagationError},
};
use bitvec::prelude::*;
use log::trace;
use std::collections::VecDeque;
use wfc_rules::Direction;

/// CPU constraint propagator driven by an explicit worklist.
///
/// Each dequeued cell notifies its neighbours; a neighbour whose domain
/// shrinks is queued in turn. A cell is never queued twice at once, and the
/// loop ends when the queue drains, which it must since domains only shrink.
#[derive(Debug, Clone, Default)]
pub struct CpuConstraintPropagator {
    revisions: u64,
}

impl CpuConstraintPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of neighbour re-filters performed by this propagator.
    pub fn revisions(&self) -> u64 {
        self.revisions
    }
}

impl ConstraintPropagator for CpuConstraintPropagator {
    fn propagate(
        &mut self,
        grid: &mut PossibilityGrid,
        updated_coords: Vec<(usize, usize)>,
    ) -> Result<(), PropagationError> {
        let width = grid.width();
        let height = grid.height();

        let mut queued = bitvec![0; grid.cells().len()];
        let mut worklist = VecDeque::with_capacity(updated_coords.len());
        for (x, y) in updated_coords {
            if x >= width || y >= height {
                return Err(PropagationError::InternalError(format!(
                    "update coordinate ({x}, {y}) outside {width}x{height} grid"
                )));
            }
            let idx = y * width + x;
            if !queued[idx] {
                queued.set(idx, true);
                worklist.push_back((x, y));
            }
        }

        while let Some((x, y)) = worklist.pop_front() {
            queued.set(y * width + x, false);

            for direction in Direction::ALL {
                let Some((nx, ny)) = grid.neighbor(x, y, direction) else {
                    continue;
                };
                self.revisions += 1;
                // The neighbour finds (x, y) on the opposite side.
                if grid.propagate_from(nx, ny, direction.opposite())? {
                    trace!("({x}, {y}) narrowed ({nx}, {ny}) via its {direction} edge");
                    let idx = ny * width + nx;
                    if !queued[idx] {
                        queued.set(idx, true);
                        worklist.push_back((nx, ny));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundaryMode, Cell};
    use std::sync::Arc;
    use wfc_rules::{TileCatalog, TileDefinition, TileId};

    // Horizontal chain: A must be followed by B, B by C, C by A.
    fn cycle_catalog() -> Arc<TileCatalog> {
        Arc::new(
            TileCatalog::new(vec![
                TileDefinition::new("A", "v", "ab", "v", "ca"),
                TileDefinition::new("B", "v", "bc", "v", "ab"),
                TileDefinition::new("C", "v", "ca", "v", "bc"),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_propagate_cascades_along_row() {
        let mut grid = PossibilityGrid::new(4, 1, cycle_catalog());
        *grid.get_mut(0, 0).unwrap() = Cell::from_tiles(3, [TileId(0)]);
        let mut propagator = CpuConstraintPropagator::new();

        propagator.propagate(&mut grid, vec![(0, 0)]).unwrap();

        let row: Vec<_> = (0..4)
            .map(|x| grid.get(x, 0).unwrap().collapsed_tile().unwrap().0)
            .collect();
        assert_eq!(row, vec![0, 1, 2, 0]);
        assert!(propagator.revisions() > 0);
    }

    #[test]
    fn test_propagate_periodic_wraps_constraint() {
        // A row of three in the cycle closes on itself; a row of two cannot.
        let mut grid =
            PossibilityGrid::with_boundary(3, 1, cycle_catalog(), BoundaryMode::Periodic);
        *grid.get_mut(0, 0).unwrap() = Cell::from_tiles(3, [TileId(0)]);
        CpuConstraintPropagator::new()
            .propagate(&mut grid, vec![(0, 0)])
            .unwrap();
        assert_eq!(grid.get(2, 0).unwrap().collapsed_tile(), Some(TileId(2)));

        let mut grid =
            PossibilityGrid::with_boundary(2, 1, cycle_catalog(), BoundaryMode::Periodic);
        *grid.get_mut(0, 0).unwrap() = Cell::from_tiles(3, [TileId(0)]);
        let result = CpuConstraintPropagator::new().propagate(&mut grid, vec![(0, 0)]);
        assert!(matches!(result, Err(PropagationError::Contradiction(_, _))));
    }

    #[test]
    fn test_no_propagation_needed() {
        let mut grid = PossibilityGrid::new(2, 2, cycle_catalog());
        let before = grid.cells().clone();
        let mut propagator = CpuConstraintPropagator::new();

        propagator.propagate(&mut grid, vec![]).unwrap();
        assert_eq!(grid.cells(), &before);
        assert_eq!(propagator.revisions(), 0);
    }

    #[test]
    fn test_out_of_bounds_update_is_rejected() {
        let mut grid = PossibilityGrid::new(2, 2, cycle_catalog());
        let result = CpuConstraintPropagator::new().propagate(&mut grid, vec![(5, 0)]);
        assert!(matches!(result, Err(PropagationError::InternalError(_))));
    }
}
