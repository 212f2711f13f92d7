use crate::formats::{FormatParser, TileRule};
use crate::LoadError;
use csv::{ReaderBuilder, StringRecord, Trim};

/// First-column values a header row may use for the tile name.
const NAME_HEADERS: [&str; 4] = ["name", "id", "identifier", "tile"];
/// Remaining header columns, in order.
const SIDE_HEADERS: [&str; 4] = ["north", "east", "south", "west"];

/// A header row names all five columns; a row that merely starts with
/// `name` or `tile` is still a tile.
fn is_header(record: &StringRecord) -> bool {
    record.len() == 5
        && record.iter().enumerate().all(|(i, field)| {
            let field = field.to_ascii_lowercase();
            if i == 0 {
                NAME_HEADERS.contains(&field.as_str())
            } else {
                SIDE_HEADERS[i - 1] == field
            }
        })
}

/// A parser for delimited rule tables: `name,north,east,south,west` per line.
#[derive(Debug, Clone, Copy)]
pub struct CsvFormatParser {
    delimiter: u8,
}

impl Default for CsvFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatParser {
    /// Creates a comma-delimited parser.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Creates a parser for another single-byte delimiter (e.g. `b';'`).
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl FormatParser for CsvFormatParser {
    fn format_name(&self) -> &'static str {
        "Delimited text (CSV)"
    }

    fn parse_rules(&self, content: &str) -> Result<Vec<TileRule>, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(self.delimiter)
            .from_reader(content.as_bytes());

        let mut rules = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| LoadError::ParseError(format!("CSV read failed: {e}")))?;
            let line = record.position().map_or(index as u64 + 1, |p| p.line());

            if index == 0 && is_header(&record) {
                log::debug!("Skipping header row on line {line}");
                continue;
            }

            if record.len() != 5 {
                return Err(LoadError::ParseError(format!(
                    "line {line}: expected 5 fields (name, north, east, south, west), found {}",
                    record.len()
                )));
            }
            let field = |i: usize| record.get(i).unwrap_or_default().to_owned();
            let name = field(0);
            if name.is_empty() {
                return Err(LoadError::InvalidData(format!(
                    "line {line}: tile name is empty"
                )));
            }
            rules.push(TileRule {
                name,
                north: field(1),
                east: field(2),
                south: field(3),
                west: field(4),
            });
        }
        log::debug!("Parsed {} tile rules from CSV", rules.len());
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, TileId};

    #[test]
    fn test_parse_with_header_and_whitespace() {
        let content = "name,north,east,south,west\n grass , g, g , g,g\nroad,r,g,r,g\n";
        let catalog = CsvFormatParser::new().parse(content).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.id_of("grass"), Some(TileId(0)));
        let road = catalog.get(TileId(1)).unwrap();
        assert_eq!(road.socket(Direction::North).as_str(), "r");
        assert_eq!(road.socket(Direction::East).as_str(), "g");
    }

    #[test]
    fn test_parse_without_header() {
        let rules = CsvFormatParser::new().parse_rules("A,x,x,x,x\n").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "A");
    }

    #[test]
    fn test_wrong_field_count_reports_line() {
        let err = CsvFormatParser::new()
            .parse_rules("A,x,x,x,x\nB,x,x\n")
            .unwrap_err();
        match err {
            LoadError::ParseError(msg) => {
                assert!(msg.contains("line 2"), "unexpected message: {msg}");
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_first_tile_named_like_a_header_is_kept() {
        let rules = CsvFormatParser::new()
            .parse_rules("tile,x,x,x,x\nroad,r,g,r,g\n")
            .unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["tile", "road"]);

        let rules = CsvFormatParser::new()
            .parse_rules("ID,North,East,South,West\nid,a,b,c,d\n")
            .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "id");
    }

    #[test]
    fn test_custom_delimiter() {
        let rules = CsvFormatParser::with_delimiter(b';')
            .parse_rules("A;n;e;s;w\n")
            .unwrap();
        assert_eq!(rules[0].west, "w");
    }
}
