//! Plain document dump used by the text pipeline

use pdfium_render::prelude::Pdfium;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{reader, PdfError};

/// What [`extract_document`] wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDump {
    pub full_text: String,
    pub text_path: PathBuf,
    pub image_count: usize,
}

/// Write `full_text.txt` and `images/image_p{page}_{index}.png` under `output_dir`.
///
/// Each page's text is followed by a newline. Images that fail to decode are
/// skipped and do not consume an index.
pub fn extract_document(
    pdfium: &Pdfium,
    pdf_path: &Path,
    output_dir: &Path,
) -> Result<DocumentDump, PdfError> {
    let document = reader::open_document(pdfium, pdf_path)?;
    let images_dir = output_dir.join("images");
    fs::create_dir_all(&images_dir)?;

    let mut full_text = String::new();
    let mut image_count = 0;
    for (index, page) in document.pages().iter().enumerate() {
        let page_number = index + 1;
        match reader::page_text(&page) {
            Ok(text) => full_text.push_str(&text),
            Err(e) => warn!("Could not read text of page {}: {}", page_number, e),
        }
        full_text.push('\n');

        let mut page_index = 0;
        for page_image in reader::page_images(&page) {
            let image = match page_image.decoded {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping undecodable image on page {}: {}", page_number, e);
                    continue;
                }
            };
            page_index += 1;
            let path = images_dir.join(format!("image_p{page_number}_{page_index}.png"));
            match image.save(&path) {
                Ok(()) => image_count += 1,
                Err(e) => warn!("Could not write {}: {}", path.display(), e),
            }
        }
    }

    let text_path = output_dir.join("full_text.txt");
    fs::write(&text_path, &full_text)?;
    info!(
        "Wrote {} chars of text and {} images to {}",
        full_text.len(),
        image_count,
        output_dir.display()
    );

    Ok(DocumentDump {
        full_text,
        text_path,
        image_count,
    })
}
