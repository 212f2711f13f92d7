use crate::grid::PossibilityGrid;
use std::fmt::Debug;
use thiserror::Error;

pub mod cpu;
pub use cpu::CpuConstraintPropagator;

/// Errors that can occur during the constraint propagation phase of WFC.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// Indicates that a cell's possibility set became empty during propagation,
    /// meaning no tile can satisfy the constraints at this location.
    /// Contains the (x, y) coordinates of the contradictory cell.
    #[error("Contradiction detected during propagation at ({0}, {1})")]
    Contradiction(usize, usize),
    /// An internal error within the propagation logic.
    #[error("Internal propagation error: {0}")]
    InternalError(String),
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors of this trait are responsible for updating the `PossibilityGrid`
/// after some cells' domains have shrunk (e.g. a cell was collapsed), so that
/// every remaining candidate agrees with its neighbours' candidates.
pub trait ConstraintPropagator: Debug {
    /// Propagates constraints starting from a list of initially updated cells.
    ///
    /// Implementations should update the `grid` in place and stop once no
    /// domain changes any further.
    ///
    /// # Arguments
    ///
    /// * `grid` - A mutable reference to the possibility grid to update.
    /// * `updated_coords` - A list of (x, y) coordinates of cells that were initially changed.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if propagation completes successfully.
    /// * `Err(PropagationError)` if a contradiction is found or another error occurs.
    fn propagate(
        &mut self,
        grid: &mut PossibilityGrid,
        updated_coords: Vec<(usize, usize)>,
    ) -> Result<(), PropagationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wfc_rules::{TileCatalog, TileDefinition};

    // --- Mock Propagator for Testing ---
    #[derive(Debug)]
    pub struct MockPropagator {
        pub should_succeed: bool,
    }

    impl ConstraintPropagator for MockPropagator {
        fn propagate(
            &mut self,
            _grid: &mut PossibilityGrid,
            _updated_coords: Vec<(usize, usize)>,
        ) -> Result<(), PropagationError> {
            if self.should_succeed {
                Ok(())
            } else {
                Err(PropagationError::Contradiction(0, 0)) // Simulate contradiction
            }
        }
    }

    #[test]
    fn test_propagator_is_object_safe() {
        let catalog =
            Arc::new(TileCatalog::new(vec![TileDefinition::new("A", "x", "x", "x", "x")]).unwrap());
        let mut grid = PossibilityGrid::new(2, 1, catalog);
        let mut propagators: Vec<Box<dyn ConstraintPropagator>> = vec![
            Box::new(MockPropagator { should_succeed: true }),
            Box::new(MockPropagator { should_succeed: false }),
            Box::new(CpuConstraintPropagator::new()),
        ];
        let results: Vec<_> = propagators
            .iter_mut()
            .map(|p| p.propagate(&mut grid, vec![(0, 0)]))
            .collect();
        assert_eq!(results[0], Ok(()));
        assert_eq!(results[1], Err(PropagationError::Contradiction(0, 0)));
        assert_eq!(results[2], Ok(()));
    }
}
