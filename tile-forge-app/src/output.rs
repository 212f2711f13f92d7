use crate::error::AppError;
use image::RgbImage;
use std::io;
use std::path::Path;
use wfc_core::grid::PossibilityGrid;
use wfc_core::WfcError;

/// Writes the composed image; the format follows the file extension.
pub fn save_image(image: &RgbImage, output_path: &Path) -> Result<(), AppError> {
    log::info!(
        "Saving {}x{} image to {}",
        image.width(),
        image.height(),
        output_path.display()
    );
    image.save(output_path)?;
    Ok(())
}

/// Saves the final collapsed grid as a CSV table of tile names, one record
/// per grid row.
pub fn save_assignment(grid: &PossibilityGrid, output_path: &Path) -> Result<(), AppError> {
    log::info!("Saving tile assignment to {}", output_path.display());
    let assignment = grid.assignment().ok_or(WfcError::IncompleteCollapse)?;
    let catalog = grid.catalog();

    let mut writer = csv::Writer::from_path(output_path).map_err(io::Error::from)?;
    for y in 0..assignment.height {
        let row = (0..assignment.width)
            .map(|x| {
                assignment
                    .get(x, y)
                    .and_then(|tile| catalog.get(*tile))
                    .map(|definition| definition.name.as_str())
                    .ok_or_else(|| {
                        AppError::Config(format!("cell ({x}, {y}) holds an unknown tile"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        writer.write_record(&row).map_err(io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;
    use wfc_rules::{TileCatalog, TileDefinition, TileId};

    #[test]
    fn test_save_assignment_writes_names() {
        let catalog = Arc::new(
            TileCatalog::new(vec![
                TileDefinition::new("grass", "g", "g", "g", "g"),
                TileDefinition::new("water", "w", "w", "w", "w"),
            ])
            .unwrap(),
        );
        let mut grid = PossibilityGrid::new(2, 2, catalog);
        for (x, y, tile) in [(0, 0, 0), (1, 0, 1), (0, 1, 1), (1, 1, 1)] {
            grid.get_mut(x, y).unwrap().collapse_to(TileId(tile));
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("assignment.csv");
        save_assignment(&grid, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "grass,water\nwater,water\n"
        );
    }

    #[test]
    fn test_save_assignment_requires_collapse() {
        let catalog = Arc::new(
            TileCatalog::new(vec![
                TileDefinition::new("a", "x", "x", "x", "x"),
                TileDefinition::new("b", "x", "x", "x", "x"),
            ])
            .unwrap(),
        );
        let grid = PossibilityGrid::new(1, 1, catalog);
        let dir = tempdir().unwrap();
        let result = save_assignment(&grid, &dir.path().join("a.csv"));
        assert!(matches!(
            result,
            Err(AppError::WfcCore(WfcError::IncompleteCollapse))
        ));
    }

    #[test]
    fn test_save_image_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&RgbImage::new(4, 2), &path).unwrap();
        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (4, 2));
    }
}
