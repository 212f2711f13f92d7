use crate::formats::{FormatParser, TileRule};
use crate::LoadError;
#[cfg(feature = "serde")]
use serde::Deserialize;

/// A parser implementation for RON (Rusty Object Notation) format rules.
pub struct RonFormatParser;

impl Default for RonFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RonFormatParser {
    /// Creates a new RON format parser
    pub fn new() -> Self {
        Self
    }
}

/// Represents the top-level structure of the rule file in RON format.
/// Used internally for deserialization.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonRuleFile {
    /// A list defining all available tiles and their four sockets.
    tiles: Vec<TileRule>,
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse_rules(&self, ron_content: &str) -> Result<Vec<TileRule>, LoadError> {
        let rule_file: RonRuleFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;
        if let Some(empty) = rule_file.tiles.iter().find(|t| t.name.is_empty()) {
            return Err(LoadError::InvalidData(format!(
                "tile with sockets ({}, {}, {}, {}) has an empty name",
                empty.north, empty.east, empty.south, empty.west
            )));
        }
        Ok(rule_file.tiles)
    }

    /// Stub implementation when the `serde` feature is not enabled.
    #[cfg(not(feature = "serde"))]
    fn parse_rules(&self, _ron_content: &str) -> Result<Vec<TileRule>, LoadError> {
        Err(LoadError::ParseError(
            "RON parsing requires the `serde` feature".to_string(),
        ))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{Direction, TileId};

    #[test]
    fn test_parse_ron_rules() {
        let content = r#"
            (
                tiles: [
                    (name: "A", north: "x", east: "x", south: "y", west: "x"),
                    (name: "B", north: "y", east: "y", south: "y", west: "y"),
                ],
            )
        "#;
        let catalog = RonFormatParser::new().parse(content).unwrap();
        assert_eq!(catalog.len(), 2);
        let a = catalog.get(TileId(0)).unwrap();
        assert_eq!(a.socket(Direction::South).as_str(), "y");
    }

    #[test]
    fn test_parse_ron_invalid_syntax() {
        let result = RonFormatParser::new().parse_rules("( tiles: [ (name: ");
        assert!(matches!(result, Err(LoadError::ParseError(_))));
    }
}
