use paperlens_common::onnx::cosine_similarity;
use paperlens_common::ClaimVerification;
use tracing::debug;

use crate::embedder::SentenceEmbedder;
use crate::FactCheckError;

/// Sentence reported when there is nothing to compare against
pub const NO_EVIDENCE: &str = "No evidence found.";

/// Evidence sentences: the text split on `". "`, empty pieces dropped
#[must_use]
pub fn evidence_sentences(evidence: &str) -> Vec<&str> {
    evidence
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Most similar evidence sentence to `claim` and its cosine similarity.
///
/// Missing or empty evidence yields [`NO_EVIDENCE`] with score 0.0 without
/// calling the embedder.
pub fn verify_claim<E: SentenceEmbedder>(
    embedder: &E,
    claim: &str,
    evidence: Option<&str>,
) -> Result<ClaimVerification, FactCheckError> {
    let sentences = evidence.map(evidence_sentences).unwrap_or_default();
    if sentences.is_empty() {
        return Ok(ClaimVerification {
            sentence: NO_EVIDENCE.to_string(),
            score: 0.0,
        });
    }

    let mut inputs = Vec::with_capacity(sentences.len() + 1);
    inputs.push(claim);
    inputs.extend_from_slice(&sentences);
    let embeddings = embedder.embed(&inputs)?;
    if embeddings.len() != inputs.len() {
        return Err(FactCheckError::Model(format!(
            "Embedder returned {} vectors for {} sentences",
            embeddings.len(),
            inputs.len()
        )));
    }

    let claim_vec = &embeddings[0];
    let (best, score) = embeddings[1..]
        .iter()
        .map(|v| cosine_similarity(claim_vec, v))
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, score)| {
            if score > best.1 {
                (i, score)
            } else {
                best
            }
        });
    debug!("Best evidence sentence {} scored {:.3}", best, score);

    Ok(ClaimVerification {
        sentence: sentences[best].to_string(),
        score,
    })
}
