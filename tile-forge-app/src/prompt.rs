//! Interactive prompts for settings that were not configured.

use crate::error::AppError;
use std::io::{BufRead, Write};

/// Extension assumed when the extension prompt is answered with nothing.
pub const DEFAULT_EXTENSION: &str = "bmp";

/// Largest number of cells a requested grid may have.
pub const MAX_CELLS: usize = 1 << 24;

/// Parses grid dimensions written as "WIDTH,HEIGHT", both positive and with
/// at most [`MAX_CELLS`] cells in total.
pub fn parse_dimensions(text: &str) -> Result<(usize, usize), String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [width, height] = parts.as_slice() else {
        return Err(format!(
            "Invalid dimensions '{text}'. Expected two comma-separated numbers, e.g. 10,8."
        ));
    };
    let parse = |part: &str, axis: &str| match part.parse::<usize>() {
        Ok(0) => Err(format!("The {axis} must be greater than zero.")),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("Invalid {axis} '{part}' in '{text}'.")),
    };
    let (width, height) = (parse(*width, "width")?, parse(*height, "height")?);
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_CELLS => Ok((width, height)),
        _ => Err(format!(
            "A {width}x{height} grid is too large. At most {MAX_CELLS} cells are supported."
        )),
    }
}

/// Normalises a bitmap file extension: surrounding whitespace and a leading
/// dot are removed. `None` if nothing is left.
pub fn normalize_extension(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let extension = trimmed.strip_prefix('.').unwrap_or(trimmed);
    (!extension.is_empty()).then(|| extension.to_owned())
}

/// Asks questions on `output` and reads the answers from `input`,
/// re-asking until an answer is valid.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, AppError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::Config(format!(
                "input ended before a reply to '{}'",
                question.trim_end_matches([':', ' '])
            )));
        }
        Ok(line.trim().to_owned())
    }

    /// Asks for one of the `known` tileset names.
    pub fn tileset(&mut self, known: &[String]) -> Result<String, AppError> {
        writeln!(self.output, "Available tilesets: {}", known.join(", "))?;
        loop {
            let answer = self.ask("Tileset: ")?;
            if known.iter().any(|name| *name == answer) {
                return Ok(answer);
            }
            writeln!(self.output, "Unknown tileset '{answer}'.")?;
        }
    }

    /// Asks for the bitmap extension; an empty reply picks `DEFAULT_EXTENSION`.
    pub fn extension(&mut self) -> Result<String, AppError> {
        let answer = self.ask(&format!("Tile file extension [{DEFAULT_EXTENSION}]: "))?;
        Ok(normalize_extension(&answer).unwrap_or_else(|| DEFAULT_EXTENSION.to_owned()))
    }

    /// Asks for the grid size as "WIDTH,HEIGHT".
    pub fn dimensions(&mut self) -> Result<(usize, usize), AppError> {
        loop {
            let answer = self.ask("Grid dimensions (width,height): ")?;
            match parse_dimensions(&answer) {
                Ok(dimensions) => return Ok(dimensions),
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("10,8"), Ok((10, 8)));
        assert_eq!(parse_dimensions(" 3 , 4 "), Ok((3, 4)));
        assert!(parse_dimensions("10").is_err());
        assert!(parse_dimensions("10,8,2").is_err());
        assert!(parse_dimensions("0,8").is_err());
        assert!(parse_dimensions("a,b").is_err());
        assert!(parse_dimensions("-1,2").is_err());
    }

    #[test]
    fn test_parse_dimensions_rejects_oversized_grids() {
        let huge = format!("{},2", usize::MAX);
        assert!(parse_dimensions(&huge).unwrap_err().contains("too large"));
        assert!(parse_dimensions("4097,4096").is_err());
        assert_eq!(parse_dimensions("4096,4096"), Ok((4096, 4096)));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".png").as_deref(), Some("png"));
        assert_eq!(normalize_extension(" bmp ").as_deref(), Some("bmp"));
        assert_eq!(normalize_extension("  "), None);
        assert_eq!(normalize_extension("."), None);
    }

    #[test]
    fn test_tileset_reprompts_until_known() {
        let known = vec!["pipes".to_owned(), "roads".to_owned()];
        let mut prompter = prompter("rivers\nroads\n");
        assert_eq!(prompter.tileset(&known).unwrap(), "roads");

        let transcript = String::from_utf8(prompter.output).unwrap();
        assert!(transcript.contains("Available tilesets: pipes, roads"));
        assert!(transcript.contains("Unknown tileset 'rivers'."));
        assert_eq!(transcript.matches("Tileset: ").count(), 2);
    }

    #[test]
    fn test_dimensions_reprompts_on_invalid_input() {
        let mut prompter = prompter("12\n0,3\n4,3\n");
        assert_eq!(prompter.dimensions().unwrap(), (4, 3));
        let transcript = String::from_utf8(prompter.output).unwrap();
        assert_eq!(transcript.matches("Grid dimensions").count(), 3);
    }

    #[test]
    fn test_extension_default_and_dot() {
        assert_eq!(prompter("\n").extension().unwrap(), "bmp");
        assert_eq!(prompter(".png\n").extension().unwrap(), "png");
    }

    #[test]
    fn test_end_of_input_is_config_error() {
        let mut prompter = prompter("bogus\n");
        let err = prompter.tileset(&["pipes".to_owned()]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
