//! Pretrained AI-text detector

use ort::session::Session;
use paperlens_common::hub::ResolvedModel;
use paperlens_common::onnx::{create_session, load_id2label, rank_predictions, run_token_model, softmax};
use paperlens_common::{Prediction, ServiceHandle, TextClass, TextClassification};
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

use crate::TextError;

/// Raw label the detector uses for human-written text
pub const HUMAN_LABEL: &str = "Real";

pub const DEFAULT_MAX_TOKENS: usize = 512;

/// A sequence classifier returning labels ranked by score
pub trait TextClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, TextError>;
}

impl<T: TextClassifier + ?Sized> TextClassifier for &T {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, TextError> {
        (**self).classify(text)
    }
}

impl<T: TextClassifier + ?Sized> TextClassifier for Box<T> {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, TextError> {
        (**self).classify(text)
    }
}

/// RoBERTa-style sequence classifier exported to ONNX
pub struct OnnxTextClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxTextClassifier {
    pub fn load(model: &ResolvedModel, max_tokens: usize) -> Result<Self, TextError> {
        Self::from_files(&model.model, model.tokenizer_path()?, model.config_path()?, max_tokens)
    }

    pub fn from_files(
        model_path: &Path,
        tokenizer_path: &Path,
        config_path: &Path,
        max_tokens: usize,
    ) -> Result<Self, TextError> {
        let session = create_session(model_path)?;
        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| TextError::Tokenizer(format!("Failed to load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                ..Default::default()
            }))
            .map_err(|e| TextError::Tokenizer(format!("Failed to configure truncation: {e}")))?;
        let labels = load_id2label(config_path)?;
        info!("Text detector loaded with labels {:?}", labels);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }
}

impl TextClassifier for OnnxTextClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, TextError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| TextError::Tokenizer(format!("Tokenization failed: {e}")))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&t| i64::from(t)).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| i64::from(m))
            .collect();

        let output = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| TextError::Model("Text detector session poisoned".into()))?;
            run_token_model(&mut session, &ids, &mask)?
        };

        let num_labels = output.shape.last().copied().unwrap_or(0);
        if num_labels == 0 || output.data.len() < num_labels {
            return Err(TextError::Model(format!(
                "Unexpected classifier output shape {:?}",
                output.shape
            )));
        }
        let probabilities = softmax(&output.data[..num_labels]);
        Ok(rank_predictions(&probabilities, &self.labels))
    }
}

/// Map a raw detector label onto [`TextClass`]
#[must_use]
pub fn normalize_label(raw: &str) -> TextClass {
    if raw == HUMAN_LABEL {
        TextClass::Human
    } else {
        TextClass::AiGenerated
    }
}

/// Human vs AI authorship of a passage
pub struct TextDetector<C> {
    classifier: ServiceHandle<C>,
}

impl<C: TextClassifier> TextDetector<C> {
    pub fn new(classifier: ServiceHandle<C>) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.classifier.is_ready()
    }

    /// Empty input and an unavailable or failing model yield
    /// [`TextClassification::unknown`]; the model is not invoked for empty input.
    pub fn detect(&self, text: &str) -> TextClassification {
        if text.trim().is_empty() {
            return TextClassification::unknown();
        }
        let Some(classifier) = self.classifier.get() else {
            warn!(
                "Text detector unavailable: {}",
                self.classifier.reason().unwrap_or("not loaded")
            );
            return TextClassification::unknown();
        };

        match classifier.classify(text) {
            Ok(predictions) => match predictions.first() {
                Some(top) => {
                    debug!("Text detector raw label {} ({:.3})", top.label, top.score);
                    TextClassification {
                        label: normalize_label(&top.label),
                        score: top.score,
                    }
                }
                None => {
                    warn!("Text detector returned no predictions");
                    TextClassification::unknown()
                }
            },
            Err(e) => {
                warn!("Text detection failed: {}", e);
                TextClassification::unknown()
            }
        }
    }
}
