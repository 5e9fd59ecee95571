//! Visual complexity score

use image::DynamicImage;
use imageproc::edges::canny;
use paperlens_common::HeuristicsConfig;

use crate::morphology::count_all_contours;

/// Number of contours in the Canny edge map
#[must_use]
pub fn edge_contour_count(image: &DynamicImage, heuristics: &HeuristicsConfig) -> usize {
    let edges = canny(&image.to_luma8(), heuristics.canny_low, heuristics.canny_high);
    count_all_contours(&edges)
}

/// Combine word and contour counts into a score capped at `complexity_max`,
/// rounded to two decimals
#[must_use]
pub fn complexity_from_counts(word_count: usize, contour_count: usize, heuristics: &HeuristicsConfig) -> f32 {
    let text_score = word_count as f32 / heuristics.complexity_word_divisor;
    let visual_score = contour_count as f32 / heuristics.complexity_contour_divisor;
    let score = (text_score + visual_score).clamp(0.0, heuristics.complexity_max);
    (score * 100.0).round() / 100.0
}

#[must_use]
pub fn estimate_complexity(image: &DynamicImage, ocr_text: &str, heuristics: &HeuristicsConfig) -> f32 {
    let words = ocr_text.split_whitespace().count();
    complexity_from_counts(words, edge_contour_count(image, heuristics), heuristics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_counts_combine_and_round() {
        let heuristics = HeuristicsConfig::default();
        assert_eq!(complexity_from_counts(0, 0, &heuristics), 0.0);
        assert_eq!(complexity_from_counts(15, 300, &heuristics), 2.0);
        assert_eq!(complexity_from_counts(10, 0, &heuristics), 0.67);
    }

    #[test]
    fn test_score_is_capped() {
        let heuristics = HeuristicsConfig::default();
        assert_eq!(complexity_from_counts(10_000, 1_000_000, &heuristics), 10.0);
    }

    #[test]
    fn test_blank_image_scores_only_text() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
        let heuristics = HeuristicsConfig::default();
        assert_eq!(edge_contour_count(&img, &heuristics), 0);
        assert_eq!(estimate_complexity(&img, "a b c d e f g h i j k l m n o", &heuristics), 1.0);
    }

    #[test]
    fn test_shapes_add_edge_contours() {
        let mut img = GrayImage::from_pixel(120, 120, Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(30, 30), Luma([0]));
        draw_filled_rect_mut(&mut img, Rect::at(70, 70).of_size(30, 30), Luma([0]));
        let img = DynamicImage::ImageLuma8(img);
        let heuristics = HeuristicsConfig::default();
        assert!(edge_contour_count(&img, &heuristics) >= 2);
        let score = estimate_complexity(&img, "", &heuristics);
        assert!((0.0..=10.0).contains(&score));
    }
}
