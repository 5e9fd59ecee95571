//! ONNX Runtime helpers shared by the model-backed services

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::{AnalysisError, Prediction, Result};

/// Create a CPU session with full graph optimizations
pub fn create_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        return Err(AnalysisError::ModelNotFound(
            model_path.display().to_string(),
        ));
    }

    let num_threads = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4);

    info!("Loading ONNX model from {}", model_path.display());
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(num_threads)?
        .commit_from_file(model_path)
        .map_err(|e| {
            AnalysisError::Model(format!(
                "Failed to load ONNX model from {}: {e}",
                model_path.display()
            ))
        })?;
    Ok(session)
}

/// Dense output of a token model: dimensions and row-major values
#[derive(Debug, Clone, PartialEq)]
pub struct TokenModelOutput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Run a transformer over one tokenized sequence and return its first output.
///
/// Feeds `input_ids` and `attention_mask`, plus all-zero `token_type_ids`
/// when the model declares that input.
pub fn run_token_model(session: &mut Session, input_ids: &[i64], attention_mask: &[i64]) -> Result<TokenModelOutput> {
    let seq_len = input_ids.len();
    let ids = Array2::from_shape_vec((1, seq_len), input_ids.to_vec())
        .map_err(|e| AnalysisError::Model(format!("Failed to create input_ids array: {e}")))?;
    let mask = Array2::from_shape_vec((1, seq_len), attention_mask.to_vec())
        .map_err(|e| AnalysisError::Model(format!("Failed to create attention_mask array: {e}")))?;
    let type_ids = Array2::<i64>::zeros((1, seq_len));

    let wants_type_ids = session
        .inputs
        .iter()
        .any(|input| input.name == "token_type_ids");

    let ids_tensor = TensorRef::from_array_view(ids.view())?;
    let mask_tensor = TensorRef::from_array_view(mask.view())?;
    let outputs = if wants_type_ids {
        let type_ids_tensor = TensorRef::from_array_view(type_ids.view())?;
        session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_ids_tensor
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor
        ])?
    };

    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    Ok(TokenModelOutput {
        shape: shape.iter().map(|&d| d.max(0) as usize).collect(),
        data: data.to_vec(),
    })
}

#[derive(Debug, Deserialize)]
struct HfModelConfig {
    #[serde(default)]
    id2label: BTreeMap<String, String>,
    #[serde(default)]
    n_positions: Option<usize>,
    #[serde(default)]
    max_position_embeddings: Option<usize>,
}

/// Class labels of a Hugging Face `config.json`, ordered by class index
pub fn load_id2label(config_path: &Path) -> Result<Vec<String>> {
    let config = read_hf_config(config_path)?;
    let mut indexed: Vec<(usize, String)> = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|id| (id, label))
                .map_err(|_| AnalysisError::Model(format!("Invalid id2label key '{id}'")))
        })
        .collect::<Result<_>>()?;
    if indexed.is_empty() {
        return Err(AnalysisError::Model(format!(
            "No id2label mapping in {}",
            config_path.display()
        )));
    }
    indexed.sort_by_key(|(id, _)| *id);
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

/// Maximum context length declared by a Hugging Face `config.json`
pub fn load_max_positions(config_path: &Path) -> Result<Option<usize>> {
    let config = read_hf_config(config_path)?;
    Ok(config.n_positions.or(config.max_position_embeddings))
}

fn read_hf_config(config_path: &Path) -> Result<HfModelConfig> {
    let contents = std::fs::read_to_string(config_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Numerically stable softmax
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.into_iter().map(|x| x / sum).collect()
    } else {
        exps
    }
}

/// Pair probabilities with labels, highest score first
#[must_use]
pub fn rank_predictions(probabilities: &[f32], labels: &[String]) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = probabilities
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            let label = labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{i}"));
            Prediction::new(label, score)
        })
        .collect();
    predictions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    predictions
}

/// L2-normalize a vector in place
pub fn normalize_vector(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vec.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity; 0.0 when either vector has zero length
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
