use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::LoadError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),

    #[error("Tileset Error: {0}")]
    Rules(#[from] LoadError),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration Source Error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Visualization Error: {0}")]
    Visualization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// True if the error ended generation because the grid had no
    /// consistent assignment left.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::WfcCore(e) if e.is_contradiction())
    }
}
