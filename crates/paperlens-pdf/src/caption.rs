//! Caption discovery for extracted figures

use once_cell::sync::Lazy;
use regex::Regex;

use crate::layout::{Rect, TextBlock};

static CAPTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Figure|Fig\.?)\s*\d+").expect("valid caption regex"));

/// Does `text` start like a figure caption ("Figure 3", "Fig. 2", "fig4")?
#[must_use]
pub fn looks_like_caption(text: &str) -> bool {
    CAPTION_PATTERN.is_match(text.trim())
}

/// Finds the caption block belonging to an image
#[derive(Debug, Clone)]
pub struct CaptionMatcher {
    max_horizontal_offset: f32,
}

impl Default for CaptionMatcher {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl CaptionMatcher {
    #[must_use]
    pub fn new(max_horizontal_offset: f32) -> Self {
        Self {
            max_horizontal_offset,
        }
    }

    #[must_use]
    pub fn max_horizontal_offset(&self) -> f32 {
        self.max_horizontal_offset
    }

    /// Pick the nearest caption-like block strictly below `image`.
    ///
    /// Candidates start below the image's bottom edge and have a left edge
    /// within the horizontal tolerance of the image's left edge. Returns an
    /// empty string when nothing qualifies; newlines become spaces.
    #[must_use]
    pub fn find_caption(&self, blocks: &[TextBlock], image: &Rect) -> String {
        blocks
            .iter()
            .filter(|block| block.bbox.top > image.bottom)
            .filter(|block| (block.bbox.left - image.left).abs() < self.max_horizontal_offset)
            .filter(|block| looks_like_caption(&block.text))
            .min_by(|a, b| {
                let da = a.bbox.top - image.bottom;
                let db = b.bbox.top - image.bottom;
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|block| block.text.trim().replace('\n', " "))
            .unwrap_or_default()
    }
}
