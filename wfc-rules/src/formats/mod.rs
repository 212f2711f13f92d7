//! Module defining parsers for different rule file formats.

// Export the core parser trait
pub mod parser;
pub use parser::{FormatParser, TileRule};

// Format-specific implementations
pub mod csv_format;
pub use csv_format::CsvFormatParser;
pub mod ron_format;
pub use ron_format::RonFormatParser;
