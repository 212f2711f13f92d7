use crate::{PossibilityGrid, WfcError};
use image::{imageops, RgbImage};
use log::debug;

/// Builds the output bitmap for a fully collapsed grid.
///
/// The canvas is `width × tile_width` by `height × tile_height`; the bitmap
/// of each cell's tile is copied to its offset block.
///
/// # Errors
///
/// Returns `WfcError::TileSetError` if any catalog tile lacks a bitmap or the
/// bitmaps differ in size, and `WfcError::IncompleteCollapse` if any cell
/// holds more or fewer than one tile.
pub fn compose_image(grid: &PossibilityGrid) -> Result<RgbImage, WfcError> {
    let catalog = grid.catalog();
    let (tile_width, tile_height) = catalog.tile_dimensions()?;
    let assignment = grid.assignment().ok_or(WfcError::IncompleteCollapse)?;

    let canvas_width = u32::try_from(grid.width())
        .ok()
        .and_then(|w| w.checked_mul(tile_width));
    let canvas_height = u32::try_from(grid.height())
        .ok()
        .and_then(|h| h.checked_mul(tile_height));
    let (Some(canvas_width), Some(canvas_height)) = (canvas_width, canvas_height) else {
        return Err(WfcError::GridError(format!(
            "{}x{} grid of {tile_width}x{tile_height} tiles is too large to render",
            grid.width(),
            grid.height()
        )));
    };
    debug!("Composing {canvas_width}x{canvas_height} output image");

    let mut canvas = RgbImage::new(canvas_width, canvas_height);
    for (x, y, tile_id) in assignment.iter() {
        let bitmap = catalog
            .get(*tile_id)
            .and_then(|tile| tile.bitmap.as_ref())
            .ok_or_else(|| WfcError::GridError(format!("cell ({x}, {y}) has unknown tile")))?;
        let offset_x = x as i64 * i64::from(tile_width);
        let offset_y = y as i64 * i64::from(tile_height);
        imageops::replace(&mut canvas, bitmap, offset_x, offset_y);
    }
    Ok(canvas)
}
