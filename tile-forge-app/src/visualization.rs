use crate::error::AppError;
use colored::{Color, Colorize};
use std::io::Write;
use wfc_core::grid::PossibilityGrid;
use wfc_rules::TileId;

/// Trait for types that can visualize the state of the WFC `PossibilityGrid`.
///
/// Implementors define how the grid's state (candidate counts, final
/// collapsed tiles) is presented to the user.
pub trait Visualizer {
    /// Displays the current state of `grid`.
    fn display_state(&mut self, grid: &PossibilityGrid) -> Result<(), AppError>;
}

const PALETTE: [Color; 6] = [
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

/// Renders the grid as text, one glyph per cell.
///
/// A collapsed cell shows the first letter of its tile's name, coloured per
/// tile. An open cell shows its candidate count (`+` above nine) and an empty
/// cell a red `X`.
pub struct TerminalVisualizer<W: Write> {
    writer: W,
}

impl<W: Write> TerminalVisualizer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn tile_color(tile: TileId) -> Color {
        PALETTE[tile.0 % PALETTE.len()]
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, grid: &PossibilityGrid) -> Result<(), AppError> {
        let catalog = grid.catalog();
        let glyph = |tile: TileId| {
            catalog
                .get(tile)
                .and_then(|definition| definition.name.chars().next())
                .unwrap_or('?')
        };

        let mut frame = String::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let cell = grid
                    .get(x, y)
                    .ok_or_else(|| AppError::Visualization(format!("no cell at ({x}, {y})")))?;
                let rendered = match (cell.collapsed_tile(), cell.domain_size()) {
                    (Some(tile), _) => glyph(tile)
                        .to_string()
                        .color(Self::tile_color(tile))
                        .bold(),
                    (None, 0) => "X".red().bold(),
                    (None, n @ 2..=9) => n.to_string().dimmed(),
                    (None, _) => "+".dimmed(),
                };
                frame.push_str(&rendered.to_string());
            }
            frame.push('\n');
        }

        writeln!(
            self.writer,
            "--- {}x{} grid, {}/{} collapsed ---",
            grid.width(),
            grid.height(),
            grid.collapsed_count(),
            grid.width() * grid.height()
        )?;
        write!(self.writer, "{frame}")?;
        for (tile, definition) in catalog.iter() {
            writeln!(
                self.writer,
                "  {} {}",
                glyph(tile).to_string().color(Self::tile_color(tile)),
                definition.name
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
