//! Figure pipeline from page contents to HTML report, with stub engines

use image::{DynamicImage, Rgb, RgbImage};
use paperlens_authenticity::{AuthenticityChecker, AuthenticityError, ImageClassifier};
use paperlens_common::{FigureCategory, HeuristicsConfig, Prediction, ServiceHandle};
use paperlens_ocr::{OcrEngine, OcrError, PageSegMode};
use paperlens_orchestrator::{render_html, FigurePipeline, ResultCache};
use paperlens_pdf::{FigureExtractor, PageContent, PageImage, Rect, TextBlock};
use paperlens_visual::{LexiconTagger, VisualAnalyzer};
use std::path::Path;

struct SilentOcr;

impl OcrEngine for SilentOcr {
    fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
        Ok(String::new())
    }
}

struct HumanClassifier;

impl ImageClassifier for HumanClassifier {
    fn classify(&self, _image: &DynamicImage) -> Result<Vec<Prediction>, AuthenticityError> {
        Ok(vec![Prediction::new("human", 0.97), Prediction::new("artificial", 0.03)])
    }
}

fn pipeline() -> (FigureExtractor<SilentOcr>, FigurePipeline<SilentOcr, LexiconTagger, HumanClassifier>) {
    let heuristics = HeuristicsConfig::default();
    let extractor = FigureExtractor::new(ServiceHandle::Ready(SilentOcr), PageSegMode::Auto, &heuristics);
    let pipeline = FigurePipeline::new(
        FigureExtractor::new(ServiceHandle::Ready(SilentOcr), PageSegMode::Auto, &heuristics),
        VisualAnalyzer::new(
            heuristics,
            ServiceHandle::Ready(SilentOcr),
            PageSegMode::SingleBlock,
            LexiconTagger,
        ),
        AuthenticityChecker::new(ServiceHandle::Ready(HumanClassifier)),
    );
    (extractor, pipeline)
}

fn page(caption: Option<&str>) -> PageContent {
    let bbox = Rect {
        left: 72.0,
        top: 100.0,
        right: 272.0,
        bottom: 250.0,
    };
    let blocks = caption
        .map(|text| {
            vec![TextBlock {
                text: text.to_string(),
                bbox: Rect {
                    left: 72.0,
                    top: 262.0,
                    right: 300.0,
                    bottom: 274.0,
                },
            }]
        })
        .unwrap_or_default();
    PageContent {
        number: 1,
        images: vec![PageImage {
            decoded: Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                80,
                60,
                Rgb([230, 230, 230]),
            ))),
            bbox,
        }],
        blocks,
    }
}

#[test]
fn test_single_bitmap_without_caption() {
    let dir = tempfile::tempdir().unwrap();
    let (extractor, pipeline) = pipeline();
    let figures = extractor.process_page(page(None), dir.path(), &mut 0);
    let report = pipeline.analyze_all(Path::new("paper.pdf"), figures);

    assert_eq!(report.figures.len(), 1);
    let figure = &report.figures[0];
    assert_eq!(figure.caption, "");
    assert_eq!(figure.category, FigureCategory::DiagramPhoto);
    assert!(image::open(&figure.image_path).is_ok());
    assert_eq!(report.summary.human, 1);
}

#[test]
fn test_report_and_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (extractor, pipeline) = pipeline();
    let figures = extractor.process_page(
        page(Some("Figure 1: Overview of the training pipeline")),
        dir.path(),
        &mut 0,
    );
    let report = pipeline.analyze_all(Path::new("paper.pdf"), figures);
    assert_eq!(
        report.figures[0].caption,
        "Figure 1: Overview of the training pipeline"
    );

    let html = render_html(&report);
    assert!(html.contains("Detected Caption: Figure 1: Overview of the training pipeline"));
    assert!(html.contains("data:image/png;base64,"));

    let cache = ResultCache::new(dir.path().join("cache"));
    cache.store("key", &report).unwrap();
    assert_eq!(cache.load("key"), Some(report));
}
