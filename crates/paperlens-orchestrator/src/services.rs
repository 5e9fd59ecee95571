//! Model and engine loading at process start
//!
//! Every service is loaded once. A failure is logged and recorded in its
//! [`ServiceHandle`] so the pipelines degrade instead of aborting.

use paperlens_authenticity::OnnxImageClassifier;
use paperlens_common::hub::{resolve_model, ResolvedModel};
use paperlens_common::{Config, ModelSpec, ModelsConfig, ServiceHandle};
use paperlens_factcheck::{OnnxSentenceEmbedder, WikipediaClient};
use paperlens_ocr::TesseractOcr;
use paperlens_text::{OnnxCausalLm, OnnxTextClassifier};
use paperlens_visual::{LexiconTagger, OnnxPosTagger, Tagger};
use std::fmt::Display;
use tracing::{info, warn};

/// Resolve the files of `spec` and hand them to `load`
pub fn load_model<T, E: Display>(
    name: &str,
    models: &ModelsConfig,
    spec: &ModelSpec,
    load: impl FnOnce(&ResolvedModel) -> Result<T, E>,
) -> ServiceHandle<T> {
    let result = resolve_model(models, spec)
        .map_err(|e| e.to_string())
        .and_then(|model| load(&model).map_err(|e| e.to_string()));
    ServiceHandle::from_load(name, result)
}

/// Services used by the figure pipeline
pub struct FigureServices {
    pub ocr: ServiceHandle<TesseractOcr>,
    pub image_classifier: ServiceHandle<OnnxImageClassifier>,
    pub tagger: Box<dyn Tagger>,
}

impl FigureServices {
    pub fn load(config: &Config) -> Self {
        info!("Loading figure analysis services");
        let ocr = ServiceHandle::from_load("Tesseract OCR", TesseractOcr::new(config.ocr.language.clone()));
        let image_classifier = load_model(
            "image authenticity model",
            &config.models,
            &config.models.image_detector,
            OnnxImageClassifier::load,
        );
        Self {
            ocr,
            image_classifier,
            tagger: load_tagger(&config.models),
        }
    }
}

/// The configured POS model, or the lexicon tagger when none is configured
/// or it fails to load
fn load_tagger(models: &ModelsConfig) -> Box<dyn Tagger> {
    let Some(spec) = &models.pos_tagger else {
        return Box::new(LexiconTagger);
    };
    match resolve_model(models, spec)
        .map_err(|e| e.to_string())
        .and_then(|model| OnnxPosTagger::load(&model).map_err(|e| e.to_string()))
    {
        Ok(tagger) => Box::new(tagger),
        Err(e) => {
            warn!("POS tagger unavailable, using lexicon tagger: {}", e);
            Box::new(LexiconTagger)
        }
    }
}

/// Services used by the text pipeline
pub struct TextServices {
    pub language_model: ServiceHandle<OnnxCausalLm>,
    pub text_classifier: ServiceHandle<OnnxTextClassifier>,
    pub embedder: ServiceHandle<OnnxSentenceEmbedder>,
    pub evidence: WikipediaClient,
}

impl TextServices {
    pub fn load(config: &Config) -> Self {
        info!("Loading text analysis services");
        let models = &config.models;
        let language_model = load_model("language model", models, &models.language_model, |model| {
            OnnxCausalLm::load(model, config.text.max_context)
        });
        let text_classifier = load_model("text detector", models, &models.text_detector, |model| {
            OnnxTextClassifier::load(model, config.text.detector_max_tokens)
        });
        let embedder = load_model(
            "sentence embedder",
            models,
            &models.sentence_embedder,
            OnnxSentenceEmbedder::load,
        );
        Self {
            language_model,
            text_classifier,
            embedder,
            evidence: WikipediaClient::new(&config.fact_check),
        }
    }
}
