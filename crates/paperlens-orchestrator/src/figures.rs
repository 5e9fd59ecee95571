//! Figure pipeline: extraction, visual analysis and authenticity

use anyhow::{Context, Result};
use paperlens_authenticity::{AuthenticityChecker, ImageClassifier, OnnxImageClassifier};
use paperlens_common::{Config, FigureRecord, FigureReport};
use paperlens_ocr::{OcrEngine, PageSegMode, TesseractOcr};
use paperlens_pdf::{ExtractedFigure, FigureExtractor};
use paperlens_visual::{Tagger, VisualAnalyzer};
use pdfium_render::prelude::Pdfium;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::services::FigureServices;

pub struct FigurePipeline<O, T, C> {
    extractor: FigureExtractor<O>,
    analyzer: VisualAnalyzer<O, T>,
    checker: AuthenticityChecker<C>,
}

impl<'a> FigurePipeline<&'a TesseractOcr, &'a dyn Tagger, &'a OnnxImageClassifier> {
    /// Pipeline borrowing the services loaded at startup
    pub fn from_services(services: &'a FigureServices, config: &Config) -> Self {
        let extractor = FigureExtractor::new(
            services.ocr.as_ref(),
            PageSegMode::from_psm(config.ocr.page_segmentation_mode),
            &config.heuristics,
        );
        let analyzer = VisualAnalyzer::new(
            config.heuristics.clone(),
            services.ocr.as_ref(),
            PageSegMode::from_psm(config.ocr.cell_segmentation_mode),
            services.tagger.as_ref(),
        );
        let checker = AuthenticityChecker::new(services.image_classifier.as_ref());
        Self::new(extractor, analyzer, checker)
    }
}

impl<O: OcrEngine, T: Tagger, C: ImageClassifier> FigurePipeline<O, T, C> {
    pub fn new(extractor: FigureExtractor<O>, analyzer: VisualAnalyzer<O, T>, checker: AuthenticityChecker<C>) -> Self {
        Self {
            extractor,
            analyzer,
            checker,
        }
    }

    /// Extract every figure of `pdf_path` into `output_dir` and analyze it
    pub fn run(&self, pdfium: &Pdfium, pdf_path: &Path, output_dir: &Path) -> Result<FigureReport> {
        let figures = self
            .extractor
            .extract(pdfium, pdf_path, output_dir)
            .with_context(|| format!("Failed to extract figures from {}", pdf_path.display()))?;
        Ok(self.analyze_all(pdf_path, figures))
    }

    /// [`Self::run`], reusing a cached report for identical PDF bytes
    pub fn run_cached(
        &self,
        pdfium: &Pdfium,
        pdf_path: &Path,
        output_dir: &Path,
        cache: &ResultCache,
    ) -> Result<FigureReport> {
        if !pdf_path.exists() {
            return self.run(pdfium, pdf_path, output_dir);
        }
        let key = ResultCache::key_for(pdf_path)?;
        if let Some(report) = cache.load(&key) {
            return Ok(report);
        }

        let report = self.run(pdfium, pdf_path, output_dir)?;
        if let Err(e) = cache.store(&key, &report) {
            warn!("Could not cache figure analysis: {:#}", e);
        }
        Ok(report)
    }

    pub fn analyze_all(&self, pdf_path: &Path, figures: Vec<ExtractedFigure>) -> FigureReport {
        info!("Analyzing {} figures", figures.len());
        let records = figures.into_iter().map(|figure| self.analyze(figure)).collect();
        let report = FigureReport::new(pdf_path.to_path_buf(), records);
        info!(
            "Authenticity: {} human-created, {} AI-generated",
            report.summary.human, report.summary.ai
        );
        report
    }

    /// Category, keywords, complexity, authenticity and, for tables, the
    /// parsed cell grid of one figure
    pub fn analyze(&self, figure: ExtractedFigure) -> FigureRecord {
        let visual = self
            .analyzer
            .analyze(&figure.image, &figure.ocr_text, &figure.caption);
        let authenticity = self.checker.check(&figure.image_path);
        debug!(
            "{}: {} / complexity {} / {}",
            figure.image_path.display(),
            visual.category,
            visual.complexity_score,
            authenticity.label
        );

        FigureRecord {
            image_path: figure.image_path,
            page: figure.page,
            ocr_text: figure.ocr_text,
            caption: figure.caption,
            category: visual.category,
            keywords: visual.keywords,
            complexity_score: visual.complexity_score,
            authenticity,
            table: visual.table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use paperlens_authenticity::AuthenticityError;
    use paperlens_common::{AuthenticityLabel, FigureCategory, HeuristicsConfig, Prediction, ServiceHandle};
    use paperlens_ocr::OcrError;
    use paperlens_visual::LexiconTagger;
    use std::path::PathBuf;

    struct NoTextOcr;

    impl OcrEngine for NoTextOcr {
        fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
            Ok(String::new())
        }
    }

    struct AlwaysArtificial;

    impl ImageClassifier for AlwaysArtificial {
        fn classify(&self, _image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError> {
            Ok(vec![Prediction::new("artificial", 0.9), Prediction::new("human", 0.1)])
        }
    }

    fn pipeline(classifier: ServiceHandle<AlwaysArtificial>) -> FigurePipeline<NoTextOcr, LexiconTagger, AlwaysArtificial> {
        let heuristics = HeuristicsConfig::default();
        FigurePipeline::new(
            FigureExtractor::new(ServiceHandle::Ready(NoTextOcr), PageSegMode::Auto, &heuristics),
            VisualAnalyzer::new(
                heuristics,
                ServiceHandle::Ready(NoTextOcr),
                PageSegMode::SingleBlock,
                LexiconTagger,
            ),
            AuthenticityChecker::new(classifier),
        )
    }

    fn figure(dir: &Path, caption: &str) -> ExtractedFigure {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 40, Rgb([240, 240, 240])));
        let image_path = dir.join("figure_1_p1.png");
        image.save(&image_path).unwrap();
        ExtractedFigure {
            image_path,
            page: 1,
            ocr_text: String::new(),
            caption: caption.to_string(),
            image,
        }
    }

    #[test]
    fn test_plain_figure_record() {
        let dir = tempfile::tempdir().unwrap();
        let record = pipeline(ServiceHandle::Ready(AlwaysArtificial)).analyze(figure(dir.path(), ""));

        assert_eq!(record.category, FigureCategory::DiagramPhoto);
        assert_eq!(record.caption, "");
        assert!(record.keywords.is_empty());
        assert!(record.table.is_none());
        assert!((0.0..=10.0).contains(&record.complexity_score));
        assert_eq!(record.authenticity.label, AuthenticityLabel::AiGenerated);
    }

    #[test]
    fn test_report_summary_counts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(ServiceHandle::Ready(AlwaysArtificial));
        let report = pipeline.analyze_all(
            Path::new("paper.pdf"),
            vec![figure(dir.path(), "Figure 1: Network architecture")],
        );
        assert_eq!(report.summary.ai, 1);
        assert_eq!(report.summary.human, 0);
        assert_eq!(report.source, PathBuf::from("paper.pdf"));
        assert!(report.figures[0].keywords.contains(&"architecture".to_string()));
    }

    #[test]
    fn test_missing_classifier_counts_toward_neither() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(ServiceHandle::unavailable("no model"));
        let report = pipeline.analyze_all(Path::new("paper.pdf"), vec![figure(dir.path(), "")]);
        assert_eq!(
            report.figures[0].authenticity.label,
            AuthenticityLabel::ModelUnavailable
        );
        assert_eq!(report.summary.determined(), 0);
    }
}
