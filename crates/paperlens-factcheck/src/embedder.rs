//! Sentence embeddings for claim verification

use ort::session::Session;
use paperlens_common::hub::ResolvedModel;
use paperlens_common::onnx::{create_session, normalize_vector, run_token_model};
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::FactCheckError;

const MAX_TOKENS: usize = 256;

/// Maps sentences to fixed-size vectors; one vector per input, same order
pub trait SentenceEmbedder {
    fn embed(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>, FactCheckError>;
}

impl<T: SentenceEmbedder + ?Sized> SentenceEmbedder for &T {
    fn embed(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>, FactCheckError> {
        (**self).embed(sentences)
    }
}

impl<T: SentenceEmbedder + ?Sized> SentenceEmbedder for Box<T> {
    fn embed(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>, FactCheckError> {
        (**self).embed(sentences)
    }
}

/// MiniLM-style encoder: mean pooling over the last hidden state, then L2
/// normalization
pub struct OnnxSentenceEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxSentenceEmbedder {
    pub fn load(model: &ResolvedModel) -> Result<Self, FactCheckError> {
        Self::from_files(&model.model, model.tokenizer_path()?)
    }

    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self, FactCheckError> {
        let session = create_session(model_path)?;
        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| FactCheckError::Tokenizer(format!("Failed to load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| FactCheckError::Tokenizer(format!("Failed to configure truncation: {e}")))?;
        info!("Sentence embedder loaded from {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed_one(&self, sentence: &str) -> Result<Vec<f32>, FactCheckError> {
        let encoding = self
            .tokenizer
            .encode(sentence, true)
            .map_err(|e| FactCheckError::Tokenizer(format!("Tokenization failed: {e}")))?;
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
                .map_err(|_| FactCheckError::Model("Embedder session poisoned".into()))?;
            run_token_model(&mut session, &ids, &mask)?
        };

        let hidden = output.shape.last().copied().unwrap_or(0);
        if hidden == 0 || output.data.len() < hidden * ids.len() {
            return Err(FactCheckError::Model(format!(
                "Unexpected hidden state shape {:?}",
                output.shape
            )));
        }
        let mut pooled = mean_pool(&output.data, &mask, hidden);
        normalize_vector(&mut pooled);
        Ok(pooled)
    }
}

impl SentenceEmbedder for OnnxSentenceEmbedder {
    fn embed(&self, sentences: &[&str]) -> Result<Vec<Vec<f32>>, FactCheckError> {
        sentences.iter().map(|s| self.embed_one(s)).collect()
    }
}

/// Average of the token vectors whose attention mask is set
pub(crate) fn mean_pool(hidden_states: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (token, &m) in hidden_states.chunks(hidden).zip(mask) {
        if m == 0 {
            continue;
        }
        for (acc, &value) in sum.iter_mut().zip(token) {
            *acc += value;
        }
        count += 1.0;
    }
    if count > 0.0 {
        for value in &mut sum {
            *value /= count;
        }
    }
    sum
}
