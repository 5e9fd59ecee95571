//! Ruled-line detection

use image::DynamicImage;
use paperlens_common::HeuristicsConfig;
use tracing::debug;

use crate::morphology::{adaptive_threshold_inverted, count_external_contours, open_rect};

/// Number of separate horizontal and vertical line segments in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCounts {
    pub horizontal: usize,
    pub vertical: usize,
}

impl GridCounts {
    /// Both counts must be strictly above their thresholds
    #[must_use]
    pub fn is_grid(&self, heuristics: &HeuristicsConfig) -> bool {
        self.horizontal > heuristics.horizontal_line_threshold
            && self.vertical > heuristics.vertical_line_threshold
    }
}

/// Count ruled lines along each axis.
///
/// The inverted image is adaptively thresholded, then opened with a long
/// thin rectangle per axis so only strokes at least the kernel length
/// survive. Each surviving external contour is one line.
#[must_use]
pub fn count_grid_lines(image: &DynamicImage, heuristics: &HeuristicsConfig) -> GridCounts {
    let gray = image.to_luma8();
    let binary = adaptive_threshold_inverted(
        &gray,
        heuristics.adaptive_block_size,
        heuristics.adaptive_offset,
    );

    let length = heuristics.line_kernel_length;
    let iterations = heuristics.morph_iterations;
    let horizontal = count_external_contours(&open_rect(&binary, length, 1, iterations));
    let vertical = count_external_contours(&open_rect(&binary, 1, length, iterations));

    debug!("Grid lines: {} horizontal, {} vertical", horizontal, vertical);
    GridCounts {
        horizontal,
        vertical,
    }
}

#[must_use]
pub fn has_grid_structure(image: &DynamicImage, heuristics: &HeuristicsConfig) -> bool {
    count_grid_lines(image, heuristics).is_grid(heuristics)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Luma, GrayImage};

    /// White image ruled with `rows` horizontal and `cols` vertical lines
    /// that never touch each other
    pub(crate) fn ruled_image(rows: u32, cols: u32) -> DynamicImage {
        let mut img = GrayImage::from_pixel(330, 330, Luma([255]));
        for r in 0..rows {
            let y = 10 + r * 12;
            for x in 200..310 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        for c in 0..cols {
            let x = 10 + c * 12;
            for y in 200..310 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_blank_image_has_no_lines() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([255])));
        let counts = count_grid_lines(&img, &HeuristicsConfig::default());
        assert_eq!(counts, GridCounts { horizontal: 0, vertical: 0 });
    }

    #[test]
    fn test_counts_separate_lines_per_axis() {
        let counts = count_grid_lines(&ruled_image(3, 5), &HeuristicsConfig::default());
        assert_eq!(counts.horizontal, 3);
        assert_eq!(counts.vertical, 5);
    }

    #[test]
    fn test_grid_requires_both_thresholds() {
        let heuristics = HeuristicsConfig::default();
        assert!(GridCounts { horizontal: 11, vertical: 16 }.is_grid(&heuristics));
        assert!(!GridCounts { horizontal: 10, vertical: 16 }.is_grid(&heuristics));
        assert!(!GridCounts { horizontal: 11, vertical: 15 }.is_grid(&heuristics));
    }

    #[test]
    fn test_dense_ruling_is_a_grid() {
        assert!(has_grid_structure(&ruled_image(12, 17), &HeuristicsConfig::default()));
        assert!(!has_grid_structure(&ruled_image(4, 4), &HeuristicsConfig::default()));
    }
}
