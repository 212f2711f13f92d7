use crate::cell::Cell;
use crate::entropy::{CpuEntropyCalculator, EntropyCalculator};
use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator, PropagationError};
use crate::{BoundaryMode, WfcError};
use log::debug;
use rand::{Rng, RngCore};
use std::sync::Arc;
use wfc_rules::{Direction, TileCatalog, TileId};

/// Generic row-major 2D grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a new grid with every element set to a clone of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`. Use [`Grid::try_filled`]
    /// for sizes that come from user input.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width.saturating_mul(height)],
        }
    }

    /// Like [`Grid::filled`], but returns `None` when `width * height`
    /// overflows `usize`.
    pub fn try_filled(width: usize, height: usize, value: T) -> Option<Self> {
        let len = width.checked_mul(height)?;
        Some(Self {
            width,
            height,
            data: vec![value; len],
        })
    }
}

impl<T> Grid<T> {
    /// Builds a grid from row-major data.
    ///
    /// Returns `None` if `data.len()` is not `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        (width.checked_mul(height) == Some(data.len())).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).and_then(move |idx| self.data.get_mut(idx))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates `(x, y, value)` in row-major order (y outer, x inner).
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, value)| (idx % width, idx / width, value))
    }

    /// Calculates the 1D index for the given 2D coordinates.
    /// Returns None if the coordinates are out of bounds.
    pub(crate) fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Grid storing the domain size of every cell, used for selection.
pub type EntropyGrid = Grid<usize>;

/// The generation state: a `width × height` arrangement of [`Cell`]s sharing
/// one read-only [`TileCatalog`].
///
/// Neighbours are not stored; they are resolved from coordinates on demand
/// according to the [`BoundaryMode`].
#[derive(Debug, Clone)]
pub struct PossibilityGrid {
    cells: Grid<Cell>,
    catalog: Arc<TileCatalog>,
    boundary_mode: BoundaryMode,
}

impl PossibilityGrid {
    /// Creates a grid with clamped boundaries where every cell starts with the
    /// full catalog as its domain.
    pub fn new(width: usize, height: usize, catalog: Arc<TileCatalog>) -> Self {
        Self::with_boundary(width, height, catalog, BoundaryMode::Clamped)
    }

    /// Creates a grid with an explicit boundary mode.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn with_boundary(
        width: usize,
        height: usize,
        catalog: Arc<TileCatalog>,
        boundary_mode: BoundaryMode,
    ) -> Self {
        let cells = Grid::filled(width, height, Cell::new(catalog.len()));
        Self {
            cells,
            catalog,
            boundary_mode,
        }
    }

    /// Creates a grid with an explicit boundary mode, rejecting dimensions
    /// whose cell count does not fit in `usize`.
    pub fn try_with_boundary(
        width: usize,
        height: usize,
        catalog: Arc<TileCatalog>,
        boundary_mode: BoundaryMode,
    ) -> Result<Self, WfcError> {
        let cells = Grid::try_filled(width, height, Cell::new(catalog.len())).ok_or_else(|| {
            WfcError::GridError(format!("a {width}x{height} grid has too many cells"))
        })?;
        Ok(Self {
            cells,
            catalog,
            boundary_mode,
        })
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    pub fn num_tiles(&self) -> usize {
        self.catalog.len()
    }

    pub fn catalog(&self) -> &Arc<TileCatalog> {
        &self.catalog
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary_mode
    }

    /// The underlying cell storage.
    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(x, y)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.cells.get_mut(x, y)
    }

    /// Coordinates of the neighbour of `(x, y)` in `direction`, handling
    /// boundary conditions. `None` past a clamped edge.
    pub fn neighbor(&self, x: usize, y: usize, direction: Direction) -> Option<(usize, usize)> {
        let (width, height) = (self.width(), self.height());
        if x >= width || y >= height {
            return None;
        }
        let (dx, dy) = direction.offset();
        let nx_raw = x as isize + dx;
        let ny_raw = y as isize + dy;

        match self.boundary_mode {
            BoundaryMode::Clamped => {
                if nx_raw >= 0 && nx_raw < width as isize && ny_raw >= 0 && ny_raw < height as isize
                {
                    Some((nx_raw as usize, ny_raw as usize))
                } else {
                    None
                }
            }
            BoundaryMode::Periodic => Some((
                nx_raw.rem_euclid(width as isize) as usize,
                ny_raw.rem_euclid(height as isize) as usize,
            )),
        }
    }

    /// Re-filters the cell at `(x, y)` against its neighbour in `from`.
    ///
    /// Keeps only the tiles whose socket on the shared edge is among the
    /// labels the neighbour can currently present back across that edge.
    /// Returns whether the cell's domain shrank.
    ///
    /// # Errors
    ///
    /// Returns `PropagationError::Contradiction` if the domain becomes empty,
    /// and `PropagationError::InternalError` if `(x, y)` is out of bounds.
    pub fn propagate_from(
        &mut self,
        x: usize,
        y: usize,
        from: Direction,
    ) -> Result<bool, PropagationError> {
        let Some((nx, ny)) = self.neighbor(x, y, from) else {
            return Ok(false);
        };
        let catalog = Arc::clone(&self.catalog);
        let allowed = self
            .cells
            .get(nx, ny)
            .ok_or_else(|| {
                PropagationError::InternalError(format!("neighbour ({nx}, {ny}) out of bounds"))
            })?
            .sockets_facing(from.opposite(), &catalog);

        let cell = self.cells.get_mut(x, y).ok_or_else(|| {
            PropagationError::InternalError(format!("cell ({x}, {y}) out of bounds"))
        })?;
        let changed = cell.retain(|tile| {
            catalog
                .get(tile)
                .is_some_and(|definition| allowed.contains(definition.socket(from)))
        });
        if changed && cell.is_contradiction() {
            return Err(PropagationError::Contradiction(x, y));
        }
        Ok(changed)
    }

    /// Collapses the cell at `(x, y)` to one random candidate without
    /// propagating. Returns the chosen tile.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::Contradiction` if the cell's domain is empty and
    /// `WfcError::GridError` if `(x, y)` is out of bounds.
    pub fn observe_cell<R: Rng + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        rng: &mut R,
    ) -> Result<TileId, WfcError> {
        let cell = self
            .cells
            .get_mut(x, y)
            .ok_or_else(|| WfcError::GridError(format!("cell ({x}, {y}) out of bounds")))?;
        cell.collapse(rng).ok_or(WfcError::Contradiction(x, y))
    }

    /// Collapses the cell at `(x, y)` and propagates the consequence through
    /// the grid until a fixpoint is reached.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::Contradiction` if the cell or any cell reached by
    /// propagation ends with an empty domain.
    pub fn collapse_cell<R: Rng + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        rng: &mut R,
    ) -> Result<TileId, WfcError> {
        let tile = self.observe_cell(x, y, rng)?;
        CpuConstraintPropagator::new().propagate(self, vec![(x, y)])?;
        Ok(tile)
    }

    /// Collapses the uncollapsed cell with the fewest candidates (first in
    /// row-major order on ties) and propagates.
    ///
    /// Returns the collapsed coordinates, or `None` if no cell has more than
    /// one candidate.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::Contradiction` if propagation empties a domain.
    pub fn collapse_least_constrained_cell<R: RngCore>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<(usize, usize)>, WfcError> {
        let calculator = CpuEntropyCalculator::default();
        let entropy = calculator.calculate_entropy(self);
        let Some((x, y)) = calculator.select_lowest_entropy_cell(&entropy, rng) else {
            return Ok(None);
        };
        let tile = self.collapse_cell(x, y, rng)?;
        debug!("Collapsed ({x}, {y}) to tile {}", tile.0);
        Ok(Some((x, y)))
    }

    /// True iff every cell holds exactly one tile.
    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.data.iter().all(Cell::is_collapsed)
    }

    /// Number of cells holding exactly one tile.
    pub fn collapsed_count(&self) -> usize {
        self.cells.data.iter().filter(|c| c.is_collapsed()).count()
    }

    /// Coordinates of the first cell (row-major) with an empty domain.
    pub fn find_contradiction(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .find(|(_, _, cell)| cell.is_contradiction())
            .map(|(x, y, _)| (x, y))
    }

    /// The chosen tile of every cell, or `None` if any cell is not collapsed.
    pub fn assignment(&self) -> Option<Grid<TileId>> {
        let tiles = self
            .cells
            .data
            .iter()
            .map(Cell::collapsed_tile)
            .collect::<Option<Vec<_>>>()?;
        Grid::from_vec(self.width(), self.height(), tiles)
    }
}
