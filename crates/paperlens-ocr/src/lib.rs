//! OCR for extracted figures and table cells
//!
//! The [`OcrEngine`] trait is the seam the rest of the pipeline depends on;
//! [`TesseractOcr`] implements it with Tesseract 5.x through `leptess`.
//!
//! # Example
//! ```no_run
//! use paperlens_ocr::{OcrEngine, PageSegMode, TesseractOcr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ocr = TesseractOcr::new("eng")?;
//! let image = image::open("figures_output/figure_1_p1.png")?;
//! let text = ocr.recognize(&image, PageSegMode::Auto)?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

use image::DynamicImage;
use leptess::{LepTess, Variable};
use paperlens_common::AnalysisError;
use thiserror::Error;
use tracing::debug;

/// Tesseract page segmentation modes used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    /// Fully automatic page segmentation (PSM 3)
    Auto,
    /// A single uniform block of text (PSM 6)
    SingleBlock,
    /// A single text line (PSM 7)
    SingleLine,
    /// Any other raw Tesseract PSM value
    Raw(u32),
}

impl PageSegMode {
    #[must_use]
    pub const fn as_psm(&self) -> u32 {
        match self {
            Self::Auto => 3,
            Self::SingleBlock => 6,
            Self::SingleLine => 7,
            Self::Raw(value) => *value,
        }
    }

    #[must_use]
    pub const fn from_psm(value: u32) -> Self {
        match value {
            3 => Self::Auto,
            6 => Self::SingleBlock,
            7 => Self::SingleLine,
            other => Self::Raw(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize Tesseract: {0}")]
    InitError(String),

    #[error("Failed to run OCR: {0}")]
    RecognitionError(String),

    #[error("Invalid image dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
}

impl From<OcrError> for AnalysisError {
    fn from(err: OcrError) -> Self {
        AnalysisError::Ocr(err.to_string())
    }
}

/// Text recognition over a raster image
pub trait OcrEngine {
    /// Recognize the text in `image`, trimmed of surrounding whitespace
    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError>;
}

/// OCR engine backed by Tesseract
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    /// Create an engine, verifying that Tesseract has data for `language`
    pub fn new(language: impl Into<String>) -> Result<Self, OcrError> {
        let language = language.into();
        LepTess::new(None, &language).map_err(|e| {
            OcrError::InitError(format!(
                "Failed to initialize Tesseract with language '{language}': {e}. \
                 Make sure the language data is installed"
            ))
        })?;
        Ok(Self { language })
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidDimensions(width, height));
        }

        let mut lt = LepTess::new(None, &self.language)
            .map_err(|e| OcrError::InitError(format!("Failed to initialize Tesseract: {e}")))?;

        lt.set_variable(Variable::TesseditPagesegMode, &mode.as_psm().to_string())
            .map_err(|e| OcrError::InitError(format!("Failed to set PSM: {e}")))?;

        // leptess decodes the image itself, so hand it an in-memory PNG
        let mut png_buf = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| OcrError::RecognitionError(format!("Failed to encode image: {e}")))?;

        lt.set_image_from_mem(png_buf.get_ref())
            .map_err(|e| OcrError::RecognitionError(format!("Failed to set image: {e}")))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::RecognitionError(e.to_string()))?;
        let text = text.trim().to_string();

        debug!(
            "OCR (psm {}) read {} chars from {}x{} image",
            mode.as_psm(),
            text.len(),
            width,
            height
        );
        Ok(text)
    }
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError> {
        (**self).recognize(image, mode)
    }
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize(&self, image: &DynamicImage, mode: PageSegMode) -> Result<String, OcrError> {
        (**self).recognize(image, mode)
    }
}
