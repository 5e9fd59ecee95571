//! PDF extraction for the figure and text pipelines
//!
//! - [`FigureExtractor`]: embedded raster images with OCR text and captions
//! - [`extract_document`]: full page text plus every decodable image
//!
//! Both read the document through a shared [`Pdfium`] binding created with
//! [`bind_pdfium`].

pub mod caption;
pub mod document;
pub mod figures;
pub mod layout;
mod reader;

pub use caption::{looks_like_caption, CaptionMatcher};
pub use document::{extract_document, DocumentDump};
pub use figures::{ExtractedFigure, FigureExtractor, PageContent, PageImage};
pub use layout::{group_into_blocks, Rect, TextBlock, TextSegment};

use paperlens_common::AnalysisError;
use pdfium_render::prelude::{Pdfium, PdfiumError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Input PDF not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to bind pdfium library: {0}")]
    Binding(String),

    #[error("pdfium error: {0}")]
    Pdfium(#[from] PdfiumError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PdfError> for AnalysisError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::InputNotFound(path) => AnalysisError::InputNotFound(path),
            PdfError::Io(e) => AnalysisError::IoError(e),
            other => AnalysisError::Pdf(other.to_string()),
        }
    }
}

/// Bind pdfium from the working directory, falling back to the system library
pub fn bind_pdfium() -> Result<Pdfium, PdfError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PdfError::Binding(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}
