use bitvec::prelude::*;
use rand::Rng;
use std::collections::HashSet;
use wfc_rules::{Direction, Socket, TileCatalog, TileId};

/// One grid position's domain: the catalog tiles still consistent with every
/// constraint propagated so far.
///
/// Bit `i` is set while `TileId(i)` remains a candidate. The domain only
/// ever shrinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    possibilities: BitVec,
}

impl Cell {
    /// Creates a cell whose domain is the whole catalog.
    pub fn new(num_tiles: usize) -> Self {
        Self {
            possibilities: bitvec![1; num_tiles],
        }
    }

    /// Creates a cell restricted to `tiles`. Ids outside `num_tiles` are ignored.
    pub fn from_tiles(num_tiles: usize, tiles: impl IntoIterator<Item = TileId>) -> Self {
        let mut possibilities = bitvec![0; num_tiles];
        for tile in tiles {
            if tile.0 < num_tiles {
                possibilities.set(tile.0, true);
            }
        }
        Self { possibilities }
    }

    /// Number of candidate tiles.
    pub fn domain_size(&self) -> usize {
        self.possibilities.count_ones()
    }

    pub fn is_collapsed(&self) -> bool {
        self.domain_size() == 1
    }

    pub fn is_contradiction(&self) -> bool {
        self.possibilities.not_any()
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.possibilities.get(tile.0).is_some_and(|bit| *bit)
    }

    /// Candidate tiles in catalog order.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.possibilities.iter_ones().map(TileId)
    }

    /// The sole remaining tile, if the cell is collapsed.
    pub fn collapsed_tile(&self) -> Option<TileId> {
        if self.is_collapsed() {
            self.tiles().next()
        } else {
            None
        }
    }

    /// The set of labels this cell can present on its `direction` side,
    /// taken over every candidate tile.
    pub fn sockets_facing<'a>(
        &self,
        direction: Direction,
        catalog: &'a TileCatalog,
    ) -> HashSet<&'a Socket> {
        self.tiles()
            .filter_map(|tile| catalog.get(tile))
            .map(|definition| definition.socket(direction))
            .collect()
    }

    /// Drops every candidate for which `keep` returns false.
    /// Returns whether the domain changed.
    pub fn retain(&mut self, mut keep: impl FnMut(TileId) -> bool) -> bool {
        let mut changed = false;
        for index in 0..self.possibilities.len() {
            if self.possibilities[index] && !keep(TileId(index)) {
                self.possibilities.set(index, false);
                changed = true;
            }
        }
        changed
    }

    /// Picks one candidate uniformly at random. `None` on an empty domain.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TileId> {
        let count = self.domain_size();
        if count == 0 {
            return None;
        }
        let pick = rng.gen_range(0..count);
        self.tiles().nth(pick)
    }

    /// Replaces the domain with the single tile `tile`.
    ///
    /// Returns `false`, leaving the domain untouched, if `tile` is not an
    /// index into the catalog.
    pub fn collapse_to(&mut self, tile: TileId) -> bool {
        if tile.0 >= self.possibilities.len() {
            return false;
        }
        self.possibilities.fill(false);
        self.possibilities.set(tile.0, true);
        true
    }

    /// Collapses the cell to a uniformly chosen candidate and returns it.
    /// Returns `None`, leaving the cell untouched, if the domain is empty.
    pub fn collapse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TileId> {
        let chosen = self.choose(rng)?;
        self.collapse_to(chosen);
        Some(chosen)
    }
}
