//! Common types and utilities for scholarly PDF analysis
//!
//! Every pipeline stage reads or fills the records defined here:
//! - [`FigureRecord`]: one extracted figure and everything learned about it
//! - [`DocumentTextRecord`]: the text-authorship and fact-check results
//! - [`FigureReport`]: all figures of a document plus the authenticity summary

pub mod config;
pub mod error;
pub mod hub;
pub mod onnx;
pub mod service;

pub use config::{
    CacheConfig, Config, ConfigError, FactCheckConfig, HeuristicsConfig, ModelSpec, ModelsConfig,
    OcrConfig, TextConfig,
};
pub use error::{AnalysisError, Result};
pub use service::ServiceHandle;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Figure category derived from grid structure and OCR digit density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureCategory {
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "chart")]
    Chart,
    #[serde(rename = "diagram / photo")]
    DiagramPhoto,
}

impl FigureCategory {
    /// Decision table combining the two heuristic signals
    #[must_use]
    pub const fn from_signals(has_grid_structure: bool, is_numeric_heavy: bool) -> Self {
        match (has_grid_structure, is_numeric_heavy) {
            (true, true) => Self::Chart,
            (true, false) => Self::Table,
            (false, true) => Self::Chart,
            (false, false) => Self::DiagramPhoto,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Chart => "chart",
            Self::DiagramPhoto => "diagram / photo",
        }
    }
}

impl fmt::Display for FigureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text grid reconstructed from a table image
///
/// Rows are ordered top to bottom and cells left to right. Rows may have
/// different lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row
    #[must_use]
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A single label/score pair produced by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Normalized output of the image authenticity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticityLabel {
    HumanCreated,
    AiGenerated,
    ModelUnavailable,
    FileNotFound,
    ProcessingFailed(String),
}

impl AuthenticityLabel {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable | Self::FileNotFound | Self::ProcessingFailed(_)
        )
    }
}

impl fmt::Display for AuthenticityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumanCreated => f.write_str("Human-created"),
            Self::AiGenerated => f.write_str("AI-generated image"),
            Self::ModelUnavailable => f.write_str("Error: Model not loaded"),
            Self::FileNotFound => f.write_str("Error: File not found"),
            Self::ProcessingFailed(reason) => write!(f, "Error processing image: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityOutcome {
    pub label: AuthenticityLabel,
    /// Classifier confidence (0.0-1.0), 0.0 for error outcomes
    pub confidence: f32,
}

impl AuthenticityOutcome {
    #[must_use]
    pub fn new(label: AuthenticityLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn error(label: AuthenticityLabel) -> Self {
        Self {
            label,
            confidence: 0.0,
        }
    }
}

/// Everything known about one extracted figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Where the figure PNG was written
    pub image_path: PathBuf,
    /// 1-based page number
    pub page: usize,
    pub ocr_text: String,
    pub caption: String,
    pub category: FigureCategory,
    pub keywords: Vec<String>,
    /// Bounded to 0.0-10.0
    pub complexity_score: f32,
    pub authenticity: AuthenticityOutcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub table: Option<TableGrid>,
}

/// Human vs AI figure counts; error outcomes count toward neither
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticitySummary {
    pub human: usize,
    pub ai: usize,
}

impl AuthenticitySummary {
    #[must_use]
    pub fn from_records(records: &[FigureRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut acc, record| {
                match record.authenticity.label {
                    AuthenticityLabel::HumanCreated => acc.human += 1,
                    AuthenticityLabel::AiGenerated => acc.ai += 1,
                    _ => {}
                }
                acc
            })
    }

    #[must_use]
    pub fn determined(&self) -> usize {
        self.human + self.ai
    }
}

/// Result of the figure pipeline for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureReport {
    pub source: PathBuf,
    pub figures: Vec<FigureRecord>,
    pub summary: AuthenticitySummary,
}

impl FigureReport {
    #[must_use]
    pub fn new(source: PathBuf, figures: Vec<FigureRecord>) -> Self {
        let summary = AuthenticitySummary::from_records(&figures);
        Self {
            source,
            figures,
            summary,
        }
    }
}

/// Normalized authorship label of the text detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextClass {
    Human,
    AiGenerated,
    Unknown,
}

impl fmt::Display for TextClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Human => "Human",
            Self::AiGenerated => "AI-Generated",
            Self::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextClassification {
    pub label: TextClass,
    pub score: f32,
}

impl TextClassification {
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            label: TextClass::Unknown,
            score: 0.0,
        }
    }
}

/// Encyclopedia summary retrieved for a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub summary: String,
    /// Canonical page URL
    pub url: String,
}

/// Best matching evidence sentence for a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimVerification {
    pub sentence: String,
    pub score: f32,
}

/// Text-authorship analysis of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTextRecord {
    pub full_text: String,
    /// Bounded prefix that the models see
    pub analyzed_text: String,
    /// `None` when the language model is unavailable
    pub perplexity: Option<f64>,
    pub burstiness: f64,
    pub classification: TextClassification,
    pub claim: Option<String>,
    pub evidence: Option<Evidence>,
    pub verification: Option<ClaimVerification>,
}
