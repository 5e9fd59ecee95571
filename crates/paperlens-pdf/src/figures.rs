//! Figure extraction: embedded images, OCR text and captions

use image::DynamicImage;
use paperlens_common::{HeuristicsConfig, ServiceHandle};
use paperlens_ocr::{OcrEngine, PageSegMode};
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::caption::CaptionMatcher;
use crate::layout::{group_into_blocks, Rect, TextBlock};
use crate::{reader, PdfError};

/// An image object as found on a page
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Decoded raster, or why decoding failed
    pub decoded: Result<DynamicImage, String>,
    pub bbox: Rect,
}

/// The parts of one page the extractor needs
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number
    pub number: usize,
    pub images: Vec<PageImage>,
    pub blocks: Vec<TextBlock>,
}

/// A figure written to disk, before visual analysis
#[derive(Debug, Clone)]
pub struct ExtractedFigure {
    pub image_path: PathBuf,
    pub page: usize,
    pub ocr_text: String,
    pub caption: String,
    pub image: DynamicImage,
}

/// Pulls figures out of a PDF
pub struct FigureExtractor<O> {
    ocr: ServiceHandle<O>,
    ocr_mode: PageSegMode,
    captions: CaptionMatcher,
}

impl<O: OcrEngine> FigureExtractor<O> {
    pub fn new(ocr: ServiceHandle<O>, ocr_mode: PageSegMode, heuristics: &HeuristicsConfig) -> Self {
        Self {
            ocr,
            ocr_mode,
            captions: CaptionMatcher::new(heuristics.caption_max_horizontal_offset),
        }
    }

    /// Extract every decodable image of `pdf_path` into `output_dir`.
    ///
    /// Files are named `figure_{n}_p{page}.png` where `n` counts successfully
    /// decoded images across the whole document. Existing files are
    /// overwritten. Only a missing or unreadable PDF is an error.
    pub fn extract(
        &self,
        pdfium: &Pdfium,
        pdf_path: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ExtractedFigure>, PdfError> {
        let document = reader::open_document(pdfium, pdf_path)?;
        std::fs::create_dir_all(output_dir)?;

        info!("Extracting figures from {}", pdf_path.display());
        let pages = document.pages().iter().enumerate().map(|(index, page)| {
            let blocks = match reader::page_text_segments(&page) {
                Ok(segments) => {
                    group_into_blocks(segments, self.captions.max_horizontal_offset())
                }
                Err(e) => {
                    warn!("Could not read text of page {}: {}", index + 1, e);
                    Vec::new()
                }
            };
            PageContent {
                number: index + 1,
                images: reader::page_images(&page),
                blocks,
            }
        });
        let figures = self.process_pages(pages, output_dir);

        info!("Extracted {} figures", figures.len());
        Ok(figures)
    }

    /// Process consecutive pages with one document-wide figure counter
    pub fn process_pages<I>(&self, pages: I, output_dir: &Path) -> Vec<ExtractedFigure>
    where
        I: IntoIterator<Item = PageContent>,
    {
        let mut counter = 0;
        pages
            .into_iter()
            .flat_map(|page| self.process_page(page, output_dir, &mut counter))
            .collect()
    }

    /// Save, OCR and caption the images of one page.
    ///
    /// `counter` is the last figure number used. Every decoded image takes
    /// the next number, even when saving it fails.
    pub fn process_page(
        &self,
        page: PageContent,
        output_dir: &Path,
        counter: &mut usize,
    ) -> Vec<ExtractedFigure> {
        let mut figures = Vec::new();

        for page_image in page.images {
            let image = match page_image.decoded {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping undecodable image on page {}: {}", page.number, e);
                    continue;
                }
            };
            *counter += 1;

            let image_path = output_dir.join(format!("figure_{}_p{}.png", counter, page.number));
            if let Err(e) = image.save(&image_path) {
                warn!("Could not write {}: {}", image_path.display(), e);
                continue;
            }

            let ocr_text = self.recognize(&image, page.number);
            let caption = self.captions.find_caption(&page.blocks, &page_image.bbox);
            debug!(
                "Figure {} on page {}: {} OCR chars, caption {:?}",
                counter,
                page.number,
                ocr_text.len(),
                caption
            );

            figures.push(ExtractedFigure {
                image_path,
                page: page.number,
                ocr_text,
                caption,
                image,
            });
        }
        figures
    }

    fn recognize(&self, image: &DynamicImage, page: usize) -> String {
        let Some(ocr) = self.ocr.get() else {
            return String::new();
        };
        ocr.recognize(image, self.ocr_mode).unwrap_or_else(|e| {
            warn!("OCR failed for image on page {}: {}", page, e);
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use paperlens_ocr::OcrError;

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &DynamicImage, _mode: PageSegMode) -> Result<String, OcrError> {
            Err(OcrError::RecognitionError("engine crashed".into()))
        }
    }

    fn white_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([255, 255, 255])))
    }

    fn extractor<O: OcrEngine>(ocr: O) -> FigureExtractor<O> {
        FigureExtractor::new(
            ServiceHandle::Ready(ocr),
            PageSegMode::Auto,
            &HeuristicsConfig::default(),
        )
    }

    fn caption_block(text: &str, top: f32) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            bbox: Rect::new(72.0, top, 300.0, top + 12.0),
        }
    }

    #[test]
    fn test_process_page_names_saves_and_captions() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageContent {
            number: 3,
            images: vec![PageImage {
                decoded: Ok(white_image()),
                bbox: Rect::new(72.0, 100.0, 372.0, 300.0),
            }],
            blocks: vec![caption_block("Figure 4: Pipeline\noverview", 310.0)],
        };

        let figures = extractor(FixedOcr("encoder decoder")).process_page(page, dir.path(), &mut 2);

        assert_eq!(figures.len(), 1);
        let figure = &figures[0];
        assert_eq!(figure.image_path, dir.path().join("figure_3_p3.png"));
        assert_eq!(figure.page, 3);
        assert_eq!(figure.ocr_text, "encoder decoder");
        assert_eq!(figure.caption, "Figure 4: Pipeline overview");

        let reloaded = image::open(&figure.image_path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (40, 30));
    }

    #[test]
    fn test_undecodable_image_is_skipped_without_consuming_counter() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageContent {
            number: 1,
            images: vec![
                PageImage {
                    decoded: Err("unsupported filter".into()),
                    bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
                },
                PageImage {
                    decoded: Ok(white_image()),
                    bbox: Rect::new(0.0, 20.0, 10.0, 30.0),
                },
            ],
            blocks: Vec::new(),
        };

        let figures = extractor(FixedOcr("")).process_page(page, dir.path(), &mut 0);

        assert_eq!(figures.len(), 1);
        assert_eq!(figures[0].image_path, dir.path().join("figure_1_p1.png"));
        assert_eq!(figures[0].caption, "");
    }

    #[test]
    fn test_ocr_failure_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageContent {
            number: 1,
            images: vec![PageImage {
                decoded: Ok(white_image()),
                bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            }],
            blocks: Vec::new(),
        };

        let figures = extractor(FailingOcr).process_page(page, dir.path(), &mut 0);
        assert_eq!(figures[0].ocr_text, "");
    }

    #[test]
    fn test_unavailable_ocr_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let extractor: FigureExtractor<FixedOcr> = FigureExtractor::new(
            ServiceHandle::unavailable("tesseract missing"),
            PageSegMode::Auto,
            &HeuristicsConfig::default(),
        );
        let page = PageContent {
            number: 2,
            images: vec![PageImage {
                decoded: Ok(white_image()),
                bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            }],
            blocks: Vec::new(),
        };

        let figures = extractor.process_page(page, dir.path(), &mut 0);
        assert_eq!(figures.len(), 1);
        assert_eq!(figures[0].ocr_text, "");
    }

    fn single_image_page(number: usize) -> PageContent {
        PageContent {
            number,
            images: vec![PageImage {
                decoded: Ok(white_image()),
                bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            }],
            blocks: Vec::new(),
        }
    }

    #[test]
    fn test_numbering_continues_across_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = single_image_page(1);
        first.images.push(first.images[0].clone());
        let empty = PageContent {
            images: Vec::new(),
            ..single_image_page(2)
        };
        let pages = vec![first, empty, single_image_page(3)];

        let figures = extractor(FixedOcr("")).process_pages(pages, dir.path());

        let names: Vec<_> = figures
            .iter()
            .map(|f| f.image_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["figure_1_p1.png", "figure_2_p1.png", "figure_3_p3.png"]);
    }

    #[test]
    fn test_failed_save_consumes_its_number_on_later_pages() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the second save on page 1 fail
        std::fs::create_dir(dir.path().join("figure_2_p1.png")).unwrap();
        let mut first = single_image_page(1);
        first.images.push(first.images[0].clone());

        let pages = vec![first, single_image_page(2)];
        let figures = extractor(FixedOcr("")).process_pages(pages, dir.path());

        assert_eq!(figures.len(), 2);
        assert_eq!(figures[0].image_path, dir.path().join("figure_1_p1.png"));
        assert_eq!(figures[1].image_path, dir.path().join("figure_3_p2.png"));
        assert!(dir.path().join("figure_3_p2.png").is_file());
    }
}
