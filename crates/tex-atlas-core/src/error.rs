use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Candidate was never submitted: {0}")]
    UnknownCandidate(String),
    #[error("Pixel data has {actual} bytes, expected {expected}")]
    PixelDataSize { expected: usize, actual: usize },
    #[error("Unsupported pixel layout: {0}")]
    UnsupportedLayout(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
