//! Token-classification POS tagger served through ONNX Runtime

use ort::session::Session;
use paperlens_common::hub::ResolvedModel;
use paperlens_common::onnx::{create_session, load_id2label, run_token_model};
use std::path::Path;
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::{is_stop_word, singularize, PosTag, TaggedText, TaggedToken, Tagger};
use crate::VisualError;

const MAX_TOKENS: usize = 512;

/// Tagger backed by a UPOS token-classification model (BERT-style)
pub struct OnnxPosTagger {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxPosTagger {
    pub fn load(model: &ResolvedModel) -> Result<Self, VisualError> {
        Self::from_files(&model.model, model.tokenizer_path()?, model.config_path()?)
    }

    pub fn from_files(model_path: &Path, tokenizer_path: &Path, config_path: &Path) -> Result<Self, VisualError> {
        let session = create_session(model_path)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| VisualError::Tokenizer(format!("Failed to load tokenizer: {e}")))?;
        let labels = load_id2label(config_path)?;
        info!("POS tagger loaded with {} labels", labels.len());
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }
}

impl Tagger for OnnxPosTagger {
    fn tag(&self, text: &str) -> Result<TaggedText, VisualError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| VisualError::Tokenizer(format!("Tokenization failed: {e}")))?;
        let len = encoding.get_ids().len().min(MAX_TOKENS);
        let ids: Vec<i64> = encoding.get_ids()[..len].iter().map(|&t| i64::from(t)).collect();
        let mask: Vec<i64> = encoding.get_attention_mask()[..len]
            .iter()
            .map(|&m| i64::from(m))
            .collect();

        let output = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| VisualError::Model("POS tagger session poisoned".into()))?;
            run_token_model(&mut session, &ids, &mask)?
        };
        let num_labels = output.shape.last().copied().unwrap_or(0);
        if num_labels == 0 {
            return Err(VisualError::Model("POS tagger returned no labels".into()));
        }

        let tags: Vec<PosTag> = output
            .data
            .chunks(num_labels)
            .take(len)
            .map(|logits| {
                let best = logits
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map_or(0, |(i, _)| i);
                self.labels
                    .get(best)
                    .map_or(PosTag::X, |label| PosTag::from_label(label))
            })
            .collect();

        let tokens = assemble_words(
            text,
            &encoding.get_word_ids()[..len],
            &encoding.get_offsets()[..len],
            &tags,
        );
        debug!("POS tagger produced {} words", tokens.len());
        Ok(TaggedText::from_tokens(tokens))
    }
}

/// Merge sub-word predictions into words, keeping the first piece's tag
pub(crate) fn assemble_words(
    text: &str,
    word_ids: &[Option<u32>],
    offsets: &[(usize, usize)],
    tags: &[PosTag],
) -> Vec<TaggedToken> {
    let mut words: Vec<(u32, usize, usize, PosTag)> = Vec::new();
    for ((word_id, &(start, end)), &tag) in word_ids.iter().zip(offsets).zip(tags) {
        let Some(word_id) = *word_id else {
            continue;
        };
        match words.last_mut() {
            Some(last) if last.0 == word_id => last.2 = last.2.max(end),
            _ => words.push((word_id, start, end, tag)),
        }
    }

    words
        .into_iter()
        .filter_map(|(_, start, end, pos)| {
            let word = text.get(start..end)?;
            let lower = word.to_lowercase();
            let lemma = match pos {
                PosTag::Noun => singularize(word),
                PosTag::Propn => word.to_string(),
                _ => lower.clone(),
            };
            Some(TaggedToken {
                text: word.to_string(),
                span: start..end,
                pos,
                lemma,
                is_stop: is_stop_word(&lower),
            })
        })
        .collect()
}
