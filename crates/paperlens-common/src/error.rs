use std::path::PathBuf;
use thiserror::Error;

/// Errors shared across the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<image::ImageError> for AnalysisError {
    fn from(err: image::ImageError) -> Self {
        AnalysisError::ImageError(err.to_string())
    }
}

impl From<ort::Error> for AnalysisError {
    fn from(err: ort::Error) -> Self {
        AnalysisError::Model(err.to_string())
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
