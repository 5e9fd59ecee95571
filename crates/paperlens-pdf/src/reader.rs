//! Thin adapters from pdfium page objects to the crate's own types

use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

use crate::figures::PageImage;
use crate::layout::{Rect, TextSegment};
use crate::PdfError;

pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
) -> Result<PdfDocument<'a>, PdfError> {
    if !path.exists() {
        return Err(PdfError::InputNotFound(path.to_path_buf()));
    }
    Ok(pdfium.load_pdf_from_file(path, None)?)
}

/// Every image object on the page, decoded or with the decode failure
pub(crate) fn page_images(page: &PdfPage) -> Vec<PageImage> {
    let page_height = page.height().value;
    page.objects()
        .iter()
        .filter_map(|object| {
            let image_object = object.as_image_object()?;
            let bbox = object
                .bounds()
                .map(|b| {
                    Rect::from_pdf_coords(
                        b.left().value,
                        b.bottom().value,
                        b.right().value,
                        b.top().value,
                        page_height,
                    )
                })
                .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
            let decoded = image_object
                .get_raw_image()
                .map_err(|e| e.to_string());
            Some(PageImage { decoded, bbox })
        })
        .collect()
}

pub(crate) fn page_text_segments(page: &PdfPage) -> Result<Vec<TextSegment>, PdfError> {
    let page_height = page.height().value;
    let text = page.text()?;
    let segments: Vec<TextSegment> = text
        .segments()
        .iter()
        .map(|segment| {
            let b = segment.bounds();
            TextSegment {
                text: segment.text(),
                bbox: Rect::from_pdf_coords(
                    b.left().value,
                    b.bottom().value,
                    b.right().value,
                    b.top().value,
                    page_height,
                ),
            }
        })
        .collect();
    debug!("Read {} text segments", segments.len());
    Ok(segments)
}

pub(crate) fn page_text(page: &PdfPage) -> Result<String, PdfError> {
    Ok(page.text()?.all())
}
