//! Table cell segmentation and per-cell OCR

use image::DynamicImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use paperlens_common::{HeuristicsConfig, TableGrid};
use paperlens_ocr::{OcrEngine, PageSegMode};
use tracing::{debug, warn};

use crate::morphology::{contour_bounding_boxes, threshold_binary_inverted, BoundingBox};

/// Candidate cell boxes in reading order.
///
/// Boxes narrower or shorter than `cell_min_size`, or wider than
/// `cell_max_width_ratio` of the image (the table's outer frame), are dropped.
#[must_use]
pub fn detect_cells(image: &DynamicImage, heuristics: &HeuristicsConfig) -> Vec<BoundingBox> {
    let gray = image.to_luma8();
    let mut binary = threshold_binary_inverted(&gray, heuristics.cell_binarize_threshold);
    for _ in 0..heuristics.cell_dilate_iterations {
        binary = dilate(&binary, Norm::LInf, 1);
    }

    let max_width = image.width() as f32 * heuristics.cell_max_width_ratio;
    contour_bounding_boxes(&binary)
        .into_iter()
        .filter(|b| {
            b.width >= heuristics.cell_min_size
                && b.height >= heuristics.cell_min_size
                && (b.width as f32) <= max_width
        })
        .collect()
}

/// Split reading-ordered cells into rows.
///
/// A cell starts a new row when its top is more than `row_gap_factor` of
/// its own height below the previous cell's top.
#[must_use]
pub fn group_rows(cells: &[BoundingBox], row_gap_factor: f32) -> Vec<Vec<BoundingBox>> {
    let mut rows = Vec::new();
    let mut current: Vec<BoundingBox> = Vec::new();
    let mut last_y: Option<u32> = None;

    for cell in cells {
        if let Some(last) = last_y {
            if cell.y as f32 > last as f32 + cell.height as f32 * row_gap_factor {
                rows.push(std::mem::take(&mut current));
            }
        }
        current.push(*cell);
        last_y = Some(cell.y);
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Reconstruct a table as rows of OCR'd cell text
pub fn parse_table<O: OcrEngine>(
    image: &DynamicImage,
    ocr: &O,
    mode: PageSegMode,
    heuristics: &HeuristicsConfig,
) -> TableGrid {
    let cells = detect_cells(image, heuristics);
    let rows = group_rows(&cells, heuristics.row_gap_factor);
    debug!("Table: {} cells in {} rows", cells.len(), rows.len());

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    let crop = image.crop_imm(cell.x, cell.y, cell.width, cell.height);
                    ocr.recognize(&crop, mode).unwrap_or_else(|e| {
                        warn!("OCR failed for table cell at ({}, {}): {}", cell.x, cell.y, e);
                        String::new()
                    })
                })
                .collect()
        })
        .collect();
    TableGrid::new(rows)
}
