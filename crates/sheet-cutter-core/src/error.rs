use thiserror::Error;

#[derive(Debug, Error)]
pub enum CutterError {
    #[error("No source image loaded")]
    NoImageLoaded,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No sprites to export")]
    NoSprites,
    #[error("No sprites selected")]
    NoSelection,
    #[error("Invalid export mode: {0}")]
    InvalidMode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CutterError {
    /// True for filesystem, decode/encode and metadata (de)serialization failures.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Image(_) | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, CutterError>;
