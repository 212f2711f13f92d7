use image::RgbImage;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Represents a unique identifier for a tile.
///
/// The wrapped value is the tile's position inside its [`TileCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// The four cardinal sides of a tile, and the four neighbours of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in north, east, south, west order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The direction pointing back across the same edge.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Grid offset of the neighbour in this direction. `y` grows southward.
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Index into per-direction arrays (N=0, E=1, S=2, W=3).
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// An edge label. Two tiles may touch across an edge only if the labels they
/// present on that edge are equal; the label itself is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Socket(pub String);

impl Socket {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Socket {
    fn from(label: &str) -> Self {
        Self(label.to_owned())
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur during TileCatalog creation or validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileSetError {
    /// The catalog must contain at least one tile.
    #[error("Tile catalog cannot be empty.")]
    EmptyCatalog,
    /// Two rule rows used the same identifier.
    #[error("Duplicate tile name: {0}")]
    DuplicateName(String),
    /// A tile has no bitmap attached, so the catalog cannot be rendered.
    #[error("Tile '{0}' has no bitmap")]
    MissingBitmap(String),
    /// Bitmaps in one catalog must all share the same pixel dimensions.
    #[error("Tile '{name}' is {found:?} pixels but the catalog expects {expected:?}")]
    DimensionMismatch {
        name: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Immutable description of one tile: its name, the socket on each side and,
/// once loaded, its RGB pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDefinition {
    pub name: String,
    /// Sockets indexed by [`Direction::index`].
    pub sockets: [Socket; 4],
    pub bitmap: Option<RgbImage>,
}

impl TileDefinition {
    /// Creates a tile without a bitmap.
    pub fn new(
        name: impl Into<String>,
        north: impl Into<Socket>,
        east: impl Into<Socket>,
        south: impl Into<Socket>,
        west: impl Into<Socket>,
    ) -> Self {
        Self {
            name: name.into(),
            sockets: [north.into(), east.into(), south.into(), west.into()],
            bitmap: None,
        }
    }

    /// Attaches decoded pixel data.
    #[must_use]
    pub fn with_bitmap(mut self, bitmap: RgbImage) -> Self {
        self.bitmap = Some(bitmap);
        self
    }

    /// The label this tile presents on `direction`.
    #[inline]
    pub fn socket(&self, direction: Direction) -> &Socket {
        &self.sockets[direction.index()]
    }
}

impl From<String> for Socket {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// The full set of tiles for one style, addressed by [`TileId`].
///
/// Built once from rule data and shared read-only by every grid cell.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    tiles: Vec<TileDefinition>,
    by_name: HashMap<String, TileId>,
}

impl TileCatalog {
    /// Creates a catalog from tile definitions, in order.
    ///
    /// # Errors
    ///
    /// Returns `TileSetError::EmptyCatalog` if `tiles` is empty.
    /// Returns `TileSetError::DuplicateName` if two tiles share a name.
    pub fn new(tiles: Vec<TileDefinition>) -> Result<Self, TileSetError> {
        if tiles.is_empty() {
            return Err(TileSetError::EmptyCatalog);
        }
        let mut by_name = HashMap::with_capacity(tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            if by_name.insert(tile.name.clone(), TileId(index)).is_some() {
                return Err(TileSetError::DuplicateName(tile.name.clone()));
            }
        }
        Ok(Self { tiles, by_name })
    }

    /// Number of tiles in the catalog.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// A catalog is never empty once constructed; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, tile_id: TileId) -> Option<&TileDefinition> {
        self.tiles.get(tile_id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<TileId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &TileDefinition)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (TileId(index), tile))
    }

    /// Mutable access used by the loader to attach bitmaps after parsing.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut TileDefinition> {
        self.tiles.iter_mut()
    }

    /// Returns the shared (width, height) of every bitmap in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `TileSetError::MissingBitmap` for the first tile without pixels.
    /// Returns `TileSetError::DimensionMismatch` for the first tile whose size
    /// differs from the first tile's.
    pub fn tile_dimensions(&self) -> Result<(u32, u32), TileSetError> {
        let mut expected = None;
        for tile in &self.tiles {
            let bitmap = tile
                .bitmap
                .as_ref()
                .ok_or_else(|| TileSetError::MissingBitmap(tile.name.clone()))?;
            let found = bitmap.dimensions();
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(TileSetError::DimensionMismatch {
                        name: tile.name.clone(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        expected.ok_or(TileSetError::EmptyCatalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(name: &str, label: &str) -> TileDefinition {
        TileDefinition::new(name, label, label, label, label)
    }

    #[test]
    fn test_direction_opposites_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let (dx, dy) = direction.offset();
            let (ox, oy) = direction.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_catalog_rejects_empty_and_duplicates() {
        assert_eq!(
            TileCatalog::new(Vec::new()).unwrap_err(),
            TileSetError::EmptyCatalog
        );
        let err = TileCatalog::new(vec![plain("A", "x"), plain("A", "y")]).unwrap_err();
        assert_eq!(err, TileSetError::DuplicateName("A".to_owned()));
    }

    #[test]
    fn test_catalog_lookup_by_name() {
        let catalog = TileCatalog::new(vec![plain("A", "x"), plain("B", "y")]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.id_of("B"), Some(TileId(1)));
        assert_eq!(catalog.id_of("C"), None);
        let b = catalog.get(TileId(1)).unwrap();
        assert_eq!(b.socket(Direction::West).as_str(), "y");
    }

    #[test]
    fn test_tile_dimensions_validation() {
        let catalog = TileCatalog::new(vec![plain("A", "x")]).unwrap();
        assert_eq!(
            catalog.tile_dimensions(),
            Err(TileSetError::MissingBitmap("A".to_owned()))
        );

        let catalog = TileCatalog::new(vec![
            plain("A", "x").with_bitmap(RgbImage::new(4, 4)),
            plain("B", "x").with_bitmap(RgbImage::new(4, 3)),
        ])
        .unwrap();
        assert!(matches!(
            catalog.tile_dimensions(),
            Err(TileSetError::DimensionMismatch {
                ref name,
                expected: (4, 4),
                found: (4, 3),
            }) if name == "B"
        ));

        let catalog = TileCatalog::new(vec![
            plain("A", "x").with_bitmap(RgbImage::new(2, 3)),
            plain("B", "x").with_bitmap(RgbImage::new(2, 3)),
        ])
        .unwrap();
        assert_eq!(catalog.tile_dimensions(), Ok((2, 3)));
    }
}
