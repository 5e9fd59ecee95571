//! Sliding-window perplexity under a causal language model

use ort::session::Session;
use paperlens_common::hub::ResolvedModel;
use paperlens_common::onnx::{create_session, load_max_positions, run_token_model};
use std::path::Path;
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::TextError;

/// Window advance between successive perplexity windows
pub const DEFAULT_STRIDE: usize = 512;

const DEFAULT_MAX_CONTEXT: usize = 1024;

/// A causal language model that scores token sequences
pub trait LanguageModel {
    /// Longest window the model accepts
    fn max_context(&self) -> usize;

    fn tokenize(&self, text: &str) -> Result<Vec<u32>, TextError>;

    /// Log-probability of every token given its prefix.
    ///
    /// Element `i` is `log p(tokens[i + 1] | tokens[..=i])`, so the result has
    /// one element fewer than `tokens`.
    fn token_log_probs(&self, tokens: &[u32]) -> Result<Vec<f64>, TextError>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn max_context(&self) -> usize {
        (**self).max_context()
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>, TextError> {
        (**self).tokenize(text)
    }

    fn token_log_probs(&self, tokens: &[u32]) -> Result<Vec<f64>, TextError> {
        (**self).token_log_probs(tokens)
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn max_context(&self) -> usize {
        (**self).max_context()
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>, TextError> {
        (**self).tokenize(text)
    }

    fn token_log_probs(&self, tokens: &[u32]) -> Result<Vec<f64>, TextError> {
        (**self).token_log_probs(tokens)
    }
}

/// Perplexity of `text` using overlapping windows.
///
/// Windows begin every `stride` tokens and hold at most `max_context`
/// tokens. Each window scores only the tokens not scored by the previous
/// window, and the window losses are averaged before exponentiation.
/// Empty text, or text with fewer than two tokens, scores 0.0.
pub fn perplexity<M: LanguageModel>(model: &M, text: &str, stride: usize) -> Result<f64, TextError> {
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    let tokens = model.tokenize(text)?;
    if tokens.len() < 2 {
        return Ok(0.0);
    }

    let max_context = model.max_context().max(2);
    let stride = stride.max(1);
    let seq_len = tokens.len();
    let mut window_nlls = Vec::new();
    let mut prev_end = 0;
    let mut begin = 0;

    while begin < seq_len {
        let end = (begin + max_context).min(seq_len);
        let target_len = end - prev_end;
        let window = &tokens[begin..end];

        if let Some(nll) = window_nll(model, window, target_len)? {
            window_nlls.push(nll);
        }

        prev_end = end;
        if end == seq_len {
            break;
        }
        begin += stride;
    }

    if window_nlls.is_empty() {
        return Ok(0.0);
    }
    let mean = window_nlls.iter().sum::<f64>() / window_nlls.len() as f64;
    debug!(
        "Perplexity over {} tokens in {} windows",
        seq_len,
        window_nlls.len()
    );
    Ok(mean.exp())
}

/// Mean negative log-likelihood of the last `target_len` tokens of `window`.
/// The first token of a window has no prefix and is never scored.
fn window_nll<M: LanguageModel>(model: &M, window: &[u32], target_len: usize) -> Result<Option<f64>, TextError> {
    let len = window.len();
    let first_target = len.saturating_sub(target_len).max(1);
    if first_target >= len {
        return Ok(None);
    }

    let log_probs = model.token_log_probs(window)?;
    if log_probs.len() + 1 < len {
        return Err(TextError::Model(format!(
            "Language model scored {} of {} tokens",
            log_probs.len() + 1,
            len
        )));
    }

    let targets = &log_probs[first_target - 1..len - 1];
    let nll = -targets.iter().sum::<f64>() / targets.len() as f64;
    Ok(Some(nll))
}

/// GPT-2 style decoder exported to ONNX (`logits` as first output)
pub struct OnnxCausalLm {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    max_context: usize,
}

impl OnnxCausalLm {
    pub fn load(model: &ResolvedModel, max_context: Option<usize>) -> Result<Self, TextError> {
        Self::from_files(&model.model, model.tokenizer_path()?, model.config.as_deref(), max_context)
    }

    /// `max_context` overrides the context length of `config.json`
    pub fn from_files(
        model_path: &Path,
        tokenizer_path: &Path,
        config_path: Option<&Path>,
        max_context: Option<usize>,
    ) -> Result<Self, TextError> {
        let session = create_session(model_path)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| TextError::Tokenizer(format!("Failed to load tokenizer: {e}")))?;

        let declared = match config_path {
            Some(path) => load_max_positions(path)?,
            None => None,
        };
        let max_context = max_context.or(declared).unwrap_or(DEFAULT_MAX_CONTEXT);
        info!("Language model loaded (context {} tokens)", max_context);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            max_context,
        })
    }
}

impl LanguageModel for OnnxCausalLm {
    fn max_context(&self) -> usize {
        self.max_context
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>, TextError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TextError::Tokenizer(format!("Tokenization failed: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn token_log_probs(&self, tokens: &[u32]) -> Result<Vec<f64>, TextError> {
        let ids: Vec<i64> = tokens.iter().map(|&t| i64::from(t)).collect();
        let mask = vec![1_i64; ids.len()];

        let output = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| TextError::Model("Language model session poisoned".into()))?;
            run_token_model(&mut session, &ids, &mask)?
        };

        let vocab = output.shape.last().copied().unwrap_or(0);
        if vocab == 0 || output.data.len() < vocab * tokens.len() {
            return Err(TextError::Model(format!(
                "Unexpected logits shape {:?}",
                output.shape
            )));
        }

        Ok(output
            .data
            .chunks(vocab)
            .zip(tokens.iter().skip(1))
            .map(|(logits, &next)| log_softmax_at(logits, next as usize))
            .collect())
    }
}

/// `log softmax(logits)[index]`, computed in f64
fn log_softmax_at(logits: &[f32], index: usize) -> f64 {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let sum: f64 = logits.iter().map(|&x| (x as f64 - max).exp()).sum();
    let target = logits.get(index).copied().unwrap_or(f32::NEG_INFINITY) as f64;
    target - max - sum.ln()
}
