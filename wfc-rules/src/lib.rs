//! Tile vocabulary and rule-table loading for the tile generator.
//!
//! A rule table lists one tile per row together with the socket label on each
//! of its four sides. The loader pairs every row with a bitmap on disk and
//! produces a [`TileCatalog`].

use std::path::PathBuf;
use thiserror::Error;

pub mod formats;
pub mod loader;
pub mod types;

pub use types::{Direction, Socket, TileCatalog, TileDefinition, TileId, TileSetError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rules format: {0}")]
    ParseError(String),
    #[error("Invalid rule data: {0}")]
    InvalidData(String),
    #[error("Failed to decode tile bitmap {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Unsupported rule file format: {0:?}")]
    UnknownFormat(PathBuf),
}

impl From<TileSetError> for LoadError {
    fn from(error: TileSetError) -> Self {
        Self::InvalidData(format!("TileSet Error: {error}"))
    }
}
