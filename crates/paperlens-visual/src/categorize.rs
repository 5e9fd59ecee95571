//! Figure categorization

use image::DynamicImage;
use paperlens_common::{FigureCategory, HeuristicsConfig};

use crate::grid::has_grid_structure;

/// Digit and letter counts of OCR text.
///
/// Only ASCII `0-9` count as digits. Superscripts, fractions and other
/// numeric symbols count toward neither total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharCounts {
    pub digits: usize,
    pub letters: usize,
}

impl CharCounts {
    #[must_use]
    pub fn of(text: &str) -> Self {
        text.chars().fold(Self::default(), |mut acc, c| {
            if c.is_ascii_digit() {
                acc.digits += 1;
            } else if c.is_alphabetic() {
                acc.letters += 1;
            }
            acc
        })
    }
}

/// More than `numeric_min_chars` digits+letters with a digit share above
/// `numeric_digit_ratio`
#[must_use]
pub fn is_numeric_heavy(ocr_text: &str, heuristics: &HeuristicsConfig) -> bool {
    let counts = CharCounts::of(ocr_text);
    let total = counts.digits + counts.letters;
    if total <= heuristics.numeric_min_chars {
        return false;
    }
    counts.digits as f64 / total as f64 > heuristics.numeric_digit_ratio
}

#[must_use]
pub fn categorize(image: &DynamicImage, ocr_text: &str, heuristics: &HeuristicsConfig) -> FigureCategory {
    FigureCategory::from_signals(
        has_grid_structure(image, heuristics),
        is_numeric_heavy(ocr_text, heuristics),
    )
}
