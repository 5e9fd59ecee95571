//! Statistical and model-based analysis of document text
//!
//! - [`perplexity`]: windowed perplexity under a [`LanguageModel`]
//! - [`burstiness`]: spread of sentence lengths
//! - [`TextDetector`]: pretrained human vs AI classifier

pub mod burstiness;
pub mod detector;
pub mod perplexity;
pub mod sentences;

pub use burstiness::{burstiness, sentence_lengths};
pub use detector::{normalize_label, OnnxTextClassifier, TextClassifier, TextDetector, HUMAN_LABEL};
pub use perplexity::{perplexity, LanguageModel, OnnxCausalLm, DEFAULT_STRIDE};
pub use sentences::{split_sentences, tokenize_words, truncate_words};

use paperlens_common::AnalysisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl From<AnalysisError> for TextError {
    fn from(err: AnalysisError) -> Self {
        TextError::Model(err.to_string())
    }
}

impl From<ort::Error> for TextError {
    fn from(err: ort::Error) -> Self {
        TextError::Model(err.to_string())
    }
}

impl From<TextError> for AnalysisError {
    fn from(err: TextError) -> Self {
        AnalysisError::Model(err.to_string())
    }
}
