//! End-to-end extraction over synthesized PDFs
//!
//! The pdfium-backed tests need a pdfium shared library next to the test
//! binary or on the system library path. Page-level tests feed
//! `PageContent` straight into the extractor.

mod common;

use common::create_pdf_with_image;
use image::{DynamicImage, Rgb, RgbImage};
use paperlens_common::{HeuristicsConfig, ServiceHandle};
use paperlens_ocr::{OcrEngine, OcrError, PageSegMode};
use paperlens_pdf::{
    bind_pdfium, extract_document, FigureExtractor, PageContent, PageImage, PdfError, Rect, TextBlock,
};

struct NoTextOcr;

impl OcrEngine for NoTextOcr {
    fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
        Ok(String::new())
    }
}

fn extractor() -> FigureExtractor<NoTextOcr> {
    FigureExtractor::new(
        ServiceHandle::Ready(NoTextOcr),
        PageSegMode::Auto,
        &HeuristicsConfig::default(),
    )
}

fn bitmap(top: f32) -> PageImage {
    PageImage {
        decoded: Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb([200, 200, 200])))),
        bbox: Rect::new(72.0, top, 272.0, top + 150.0),
    }
}

fn caption(text: &str, top: f32) -> TextBlock {
    TextBlock {
        text: text.to_string(),
        bbox: Rect::new(72.0, top, 400.0, top + 12.0),
    }
}

#[test]
fn test_pages_share_one_figure_counter() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        PageContent {
            number: 1,
            images: vec![bitmap(100.0), bitmap(400.0)],
            blocks: vec![
                caption("Figure 1: Architecture", 260.0),
                caption("Fig. 2 Loss curves", 560.0),
            ],
        },
        PageContent {
            number: 2,
            images: vec![PageImage {
                decoded: Err("JBIG2 not supported".into()),
                bbox: Rect::new(72.0, 100.0, 272.0, 250.0),
            }],
            blocks: Vec::new(),
        },
        PageContent {
            number: 3,
            images: vec![bitmap(100.0)],
            blocks: vec![caption("Table 1 is not a figure caption", 260.0)],
        },
    ];

    let figures = extractor().process_pages(pages, dir.path());

    let summary: Vec<_> = figures
        .iter()
        .map(|f| (f.image_path.clone(), f.page, f.caption.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (dir.path().join("figure_1_p1.png"), 1, "Figure 1: Architecture"),
            (dir.path().join("figure_2_p1.png"), 1, "Fig. 2 Loss curves"),
            (dir.path().join("figure_3_p3.png"), 3, ""),
        ]
    );
    assert!(figures.iter().all(|f| f.image_path.is_file()));
}

#[test]
#[ignore = "requires the pdfium library"]
fn test_single_bitmap_without_caption() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("paper.pdf");
    create_pdf_with_image(&pdf_path, &["Results are discussed below."]).unwrap();

    let pdfium = bind_pdfium().unwrap();
    let out = dir.path().join("figures_output");
    let figures = extractor().extract(&pdfium, &pdf_path, &out).unwrap();

    assert_eq!(figures.len(), 1);
    assert_eq!(figures[0].page, 1);
    assert_eq!(figures[0].caption, "");
    assert_eq!(figures[0].image_path, out.join("figure_1_p1.png"));
    assert!(image::open(&figures[0].image_path).is_ok());
}

#[test]
#[ignore = "requires the pdfium library"]
fn test_caption_below_image_is_found() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("paper.pdf");
    create_pdf_with_image(&pdf_path, &["Figure 1: Checkerboard", "test pattern."]).unwrap();

    let pdfium = bind_pdfium().unwrap();
    let figures = extractor()
        .extract(&pdfium, &pdf_path, &dir.path().join("out"))
        .unwrap();

    assert_eq!(figures.len(), 1);
    assert_eq!(figures[0].caption, "Figure 1: Checkerboard test pattern.");
}

#[test]
#[ignore = "requires the pdfium library"]
fn test_missing_pdf_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let pdfium = bind_pdfium().unwrap();
    let result = extractor().extract(&pdfium, &dir.path().join("absent.pdf"), dir.path());
    assert!(matches!(result, Err(PdfError::InputNotFound(_))));
}

#[test]
#[ignore = "requires the pdfium library"]
fn test_extract_document_writes_text_and_images() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_path = dir.path().join("paper.pdf");
    create_pdf_with_image(&pdf_path, &["Deep learning for tables."]).unwrap();

    let pdfium = bind_pdfium().unwrap();
    let out = dir.path().join("processed_output");
    let dump = extract_document(&pdfium, &pdf_path, &out).unwrap();

    assert_eq!(dump.image_count, 1);
    assert!(dump.full_text.contains("Deep learning for tables."));
    assert!(dump.full_text.ends_with('\n'));
    assert_eq!(
        std::fs::read_to_string(out.join("full_text.txt")).unwrap(),
        dump.full_text
    );
    assert!(image::open(out.join("images").join("image_p1_1.png")).is_ok());
}
