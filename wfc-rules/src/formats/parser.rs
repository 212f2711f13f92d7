use crate::{LoadError, TileCatalog, TileDefinition};

/// One parsed rule row: a tile name and its north/east/south/west labels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct TileRule {
    pub name: String,
    pub north: String,
    pub east: String,
    pub south: String,
    pub west: String,
}

impl TileRule {
    /// Converts the row into a tile definition without a bitmap.
    pub fn into_definition(self) -> TileDefinition {
        TileDefinition::new(self.name, self.north, self.east, self.south, self.west)
    }
}

/// Trait defining the interface for format-specific rule parsers.
///
/// Implementors of this trait can parse tile rules from different file
/// formats (delimited text, RON, ...).
pub trait FormatParser {
    /// Parses rule content into rule rows, in file order.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the rule content
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<TileRule>)` - Successfully parsed rows
    /// * `Err(LoadError)` - Error encountered during parsing
    fn parse_rules(&self, content: &str) -> Result<Vec<TileRule>, LoadError>;

    /// Returns a descriptive name for this parser format.
    ///
    /// This can be used for debugging, logging, or user-facing error messages.
    fn format_name(&self) -> &'static str;

    /// Parses rule content straight into a catalog (without bitmaps).
    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError> {
        let rules = self.parse_rules(content)?;
        let tiles = rules.into_iter().map(TileRule::into_definition).collect();
        Ok(TileCatalog::new(tiles)?)
    }
}
