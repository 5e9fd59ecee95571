//! Visual analysis of extracted figures
//!
//! - [`categorize`]: table / chart / diagram from ruled lines and digit density
//! - [`parse_table`]: cell segmentation with per-cell OCR
//! - [`extract_keywords`]: caption keywords through a [`Tagger`]
//! - [`estimate_complexity`]: bounded 0-10 score from words and edge contours
//!
//! Every threshold comes from [`HeuristicsConfig`].

pub mod categorize;
pub mod complexity;
pub mod grid;
pub mod keywords;
pub mod morphology;
pub mod table;

pub use categorize::{categorize, is_numeric_heavy};
pub use complexity::estimate_complexity;
pub use grid::{count_grid_lines, has_grid_structure, GridCounts};
pub use keywords::{extract_keywords, LexiconTagger, OnnxPosTagger, PosTag, TaggedText, TaggedToken, Tagger};
pub use table::parse_table;

use image::DynamicImage;
use paperlens_common::{AnalysisError, FigureCategory, HeuristicsConfig, ServiceHandle, TableGrid};
use paperlens_ocr::{OcrEngine, PageSegMode};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum VisualError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl From<AnalysisError> for VisualError {
    fn from(err: AnalysisError) -> Self {
        VisualError::Model(err.to_string())
    }
}

impl From<VisualError> for AnalysisError {
    fn from(err: VisualError) -> Self {
        AnalysisError::Model(err.to_string())
    }
}

/// What the visual stage learns about one figure
#[derive(Debug, Clone, PartialEq)]
pub struct VisualAnalysis {
    pub category: FigureCategory,
    pub keywords: Vec<String>,
    pub complexity_score: f32,
    /// Only for figures categorized as tables
    pub table: Option<TableGrid>,
}

/// Runs every visual heuristic over a figure
pub struct VisualAnalyzer<O, T> {
    heuristics: HeuristicsConfig,
    ocr: ServiceHandle<O>,
    cell_mode: PageSegMode,
    tagger: T,
}

impl<O: OcrEngine, T: Tagger> VisualAnalyzer<O, T> {
    pub fn new(heuristics: HeuristicsConfig, ocr: ServiceHandle<O>, cell_mode: PageSegMode, tagger: T) -> Self {
        Self {
            heuristics,
            ocr,
            cell_mode,
            tagger,
        }
    }

    #[must_use]
    pub fn heuristics(&self) -> &HeuristicsConfig {
        &self.heuristics
    }

    #[must_use]
    pub fn categorize(&self, image: &DynamicImage, ocr_text: &str) -> FigureCategory {
        categorize(image, ocr_text, &self.heuristics)
    }

    /// Keywords of a caption; tagging failures yield no keywords
    #[must_use]
    pub fn keywords(&self, caption: &str) -> Vec<String> {
        extract_keywords(&self.tagger, caption).unwrap_or_else(|e| {
            warn!("Keyword extraction failed: {}", e);
            Vec::new()
        })
    }

    #[must_use]
    pub fn complexity(&self, image: &DynamicImage, ocr_text: &str) -> f32 {
        estimate_complexity(image, ocr_text, &self.heuristics)
    }

    /// Cell grid of a table image, `None` when OCR is unavailable
    #[must_use]
    pub fn parse_table(&self, image: &DynamicImage) -> Option<TableGrid> {
        let Some(ocr) = self.ocr.get() else {
            debug!(
                "Skipping table parsing: {}",
                self.ocr.reason().unwrap_or("OCR unavailable")
            );
            return None;
        };
        Some(parse_table(image, ocr, self.cell_mode, &self.heuristics))
    }

    pub fn analyze(&self, image: &DynamicImage, ocr_text: &str, caption: &str) -> VisualAnalysis {
        let category = self.categorize(image, ocr_text);
        let table = if category == FigureCategory::Table {
            self.parse_table(image)
        } else {
            None
        };
        VisualAnalysis {
            category,
            keywords: self.keywords(caption),
            complexity_score: self.complexity(image, ocr_text),
            table,
        }
    }
}
