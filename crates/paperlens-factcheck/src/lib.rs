//! Fact-checking prototype
//!
//! The first sentence of a passage is treated as a claim, looked up in an
//! [`EvidenceSource`] and compared sentence by sentence with the retrieved
//! summary through a [`SentenceEmbedder`].

pub mod claim;
pub mod embedder;
pub mod verify;
pub mod wikipedia;

pub use claim::extract_claim;
pub use embedder::{OnnxSentenceEmbedder, SentenceEmbedder};
pub use verify::{evidence_sentences, verify_claim, NO_EVIDENCE};
pub use wikipedia::{EvidenceSource, WikipediaClient};

use paperlens_common::{AnalysisError, ClaimVerification, Evidence, ServiceHandle};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum FactCheckError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl From<AnalysisError> for FactCheckError {
    fn from(err: AnalysisError) -> Self {
        FactCheckError::Model(err.to_string())
    }
}

impl From<ort::Error> for FactCheckError {
    fn from(err: ort::Error) -> Self {
        FactCheckError::Model(err.to_string())
    }
}

impl From<FactCheckError> for AnalysisError {
    fn from(err: FactCheckError) -> Self {
        match err {
            FactCheckError::Network(msg) => AnalysisError::Network(msg),
            other => AnalysisError::Model(other.to_string()),
        }
    }
}

/// Everything the fact checker learned about one passage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactCheckOutcome {
    pub claim: Option<String>,
    pub evidence: Option<Evidence>,
    /// Only computed when evidence was found
    pub verification: Option<ClaimVerification>,
}

pub struct FactChecker<S, E> {
    source: S,
    embedder: ServiceHandle<E>,
}

impl<S: EvidenceSource, E: SentenceEmbedder> FactChecker<S, E> {
    pub fn new(source: S, embedder: ServiceHandle<E>) -> Self {
        Self { source, embedder }
    }

    /// Claim, evidence and verification of `text`. Retrieval and embedding
    /// failures are logged and leave the corresponding field empty.
    pub fn check(&self, text: &str) -> FactCheckOutcome {
        let Some(claim) = extract_claim(text) else {
            info!("No claim extracted");
            return FactCheckOutcome::default();
        };
        info!("Fact-checking claim: {}", claim);

        let evidence = match self.source.fetch(&claim) {
            Ok(evidence) => evidence,
            Err(e) => {
                warn!("Evidence retrieval failed: {}", e);
                None
            }
        };

        let verification = evidence.as_ref().and_then(|evidence| self.verify(&claim, &evidence.summary));

        FactCheckOutcome {
            claim: Some(claim),
            evidence,
            verification,
        }
    }

    fn verify(&self, claim: &str, summary: &str) -> Option<ClaimVerification> {
        let Some(embedder) = self.embedder.get() else {
            warn!(
                "Skipping verification: {}",
                self.embedder.reason().unwrap_or("sentence embedder unavailable")
            );
            return None;
        };
        match verify_claim(embedder, claim, Some(summary)) {
            Ok(verification) => Some(verification),
            Err(e) => {
                warn!("Claim verification failed: {}", e);
                None
            }
        }
    }
}
