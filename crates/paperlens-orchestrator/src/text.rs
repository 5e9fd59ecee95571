//! Text pipeline: document dump, authorship statistics and fact checking

use anyhow::{Context, Result};
use paperlens_common::{Config, DocumentTextRecord, ServiceHandle, TextConfig};
use paperlens_factcheck::{EvidenceSource, FactChecker, OnnxSentenceEmbedder, SentenceEmbedder, WikipediaClient};
use paperlens_pdf::extract_document;
use paperlens_text::{
    burstiness, perplexity, truncate_words, LanguageModel, OnnxCausalLm, OnnxTextClassifier, TextClassifier,
    TextDetector,
};
use pdfium_render::prelude::Pdfium;
use std::path::Path;
use tracing::{info, warn};

use crate::services::TextServices;

pub struct TextPipeline<L, C, S, E> {
    language_model: ServiceHandle<L>,
    detector: TextDetector<C>,
    fact_checker: FactChecker<S, E>,
    config: TextConfig,
}

impl<'a> TextPipeline<&'a OnnxCausalLm, &'a OnnxTextClassifier, &'a WikipediaClient, &'a OnnxSentenceEmbedder> {
    /// Pipeline borrowing the services loaded at startup
    pub fn from_services(services: &'a TextServices, config: &Config) -> Self {
        Self::new(
            services.language_model.as_ref(),
            TextDetector::new(services.text_classifier.as_ref()),
            FactChecker::new(&services.evidence, services.embedder.as_ref()),
            config.text.clone(),
        )
    }
}

impl<L, C, S, E> TextPipeline<L, C, S, E>
where
    L: LanguageModel,
    C: TextClassifier,
    S: EvidenceSource,
    E: SentenceEmbedder,
{
    pub fn new(
        language_model: ServiceHandle<L>,
        detector: TextDetector<C>,
        fact_checker: FactChecker<S, E>,
        config: TextConfig,
    ) -> Self {
        Self {
            language_model,
            detector,
            fact_checker,
            config,
        }
    }

    /// Dump the document into `output_dir`, then analyze `full_text.txt`
    pub fn run(&self, pdfium: &Pdfium, pdf_path: &Path, output_dir: &Path) -> Result<DocumentTextRecord> {
        let dump = extract_document(pdfium, pdf_path, output_dir)
            .with_context(|| format!("Failed to process {}", pdf_path.display()))?;
        info!(
            "Wrote {} and {} images",
            dump.text_path.display(),
            dump.image_count
        );
        let full_text = std::fs::read_to_string(&dump.text_path)
            .with_context(|| format!("Failed to read {}", dump.text_path.display()))?;
        Ok(self.analyze(full_text))
    }

    /// Analyze the first `max_words` words of `full_text`
    pub fn analyze(&self, full_text: String) -> DocumentTextRecord {
        let analyzed_text = truncate_words(&full_text, self.config.max_words);
        info!(
            "Analyzing {} words",
            analyzed_text.split_whitespace().count()
        );

        let perplexity = self.perplexity(&analyzed_text);
        let burstiness = burstiness(&analyzed_text);
        let classification = self.detector.detect(&analyzed_text);
        let fact_check = self.fact_checker.check(&analyzed_text);

        DocumentTextRecord {
            full_text,
            analyzed_text,
            perplexity,
            burstiness,
            classification,
            claim: fact_check.claim,
            evidence: fact_check.evidence,
            verification: fact_check.verification,
        }
    }

    fn perplexity(&self, text: &str) -> Option<f64> {
        let Some(model) = self.language_model.get() else {
            warn!(
                "Skipping perplexity: {}",
                self.language_model.reason().unwrap_or("language model unavailable")
            );
            return None;
        };
        match perplexity(model, text, self.config.perplexity_stride) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Perplexity failed: {}", e);
                None
            }
        }
    }
}
