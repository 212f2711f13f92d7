use crate::formats::{CsvFormatParser, FormatParser, RonFormatParser};
use crate::{LoadError, TileCatalog};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// File stems the loader accepts as a tileset's rule table, in lookup order.
pub const RULE_FILE_NAMES: [&str; 2] = ["rules.csv", "rules.ron"];

fn parser_for(path: &Path) -> Result<Box<dyn FormatParser>, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv" | "txt") => Ok(Box::new(CsvFormatParser::new())),
        Some("ron") => Ok(Box::new(RonFormatParser::new())),
        _ => Err(LoadError::UnknownFormat(path.to_path_buf())),
    }
}

/// Loads a tile catalog (without bitmaps) from a rule file.
///
/// The format is chosen from the file extension: `.csv`/`.txt` for delimited
/// rows, `.ron` for RON.
///
/// # Errors
///
/// Returns `LoadError` if the file cannot be read, has an unknown extension,
/// or does not describe a valid catalog.
pub fn load_from_file(path: &Path) -> Result<TileCatalog, LoadError> {
    let parser = parser_for(path)?;
    let content = fs::read_to_string(path)?;
    debug!("Parsing {:?} as {}", path, parser.format_name());
    parser.parse(&content)
}

/// Returns the rule table inside a tileset directory, if one exists.
pub fn find_rule_file(dir: &Path) -> Option<PathBuf> {
    RULE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Loads a complete tileset: the rule table in `dir` plus one bitmap per tile,
/// read from `dir/<tile name>.<extension>`.
///
/// Bitmaps are converted to 8-bit RGB; any alpha channel is dropped.
///
/// # Errors
///
/// Returns `LoadError::InvalidData` if `dir` has no rule table,
/// `LoadError::Io`/`LoadError::Image` if a bitmap is missing or undecodable,
/// and any parse error from the rule table.
pub fn load_tileset(dir: &Path, extension: &str) -> Result<TileCatalog, LoadError> {
    let rule_file = find_rule_file(dir).ok_or_else(|| {
        LoadError::InvalidData(format!(
            "no rule table ({}) found in {:?}",
            RULE_FILE_NAMES.join(" or "),
            dir
        ))
    })?;
    let mut catalog = load_from_file(&rule_file)?;
    let extension = extension.trim_start_matches('.');

    for tile in catalog.tiles_mut() {
        let path = dir.join(format!("{}.{}", tile.name, extension));
        if !path.is_file() {
            return Err(LoadError::InvalidData(format!(
                "tile '{}' has no bitmap at {:?}",
                tile.name, path
            )));
        }
        let decoded = image::open(&path).map_err(|source| LoadError::Image {
            path: path.clone(),
            source,
        })?;
        tile.bitmap = Some(decoded.to_rgb8());
    }

    info!(
        "Loaded tileset {:?}: {} tiles from {:?}",
        dir.file_name().unwrap_or(dir.as_os_str()),
        catalog.len(),
        rule_file
    );
    Ok(catalog)
}

/// Lists the tilesets available under `root`: the sorted names of its
/// sub-directories that contain a rule table.
///
/// # Errors
///
/// Returns `LoadError::Io` if `root` cannot be read.
pub fn list_tilesets(root: &Path) -> Result<Vec<String>, LoadError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() && find_rule_file(&path).is_some() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}
