//! Page geometry and text block grouping
//!
//! pdfium reports text as segments (runs sharing a baseline) in PDF
//! coordinates with a bottom-left origin. Everything here uses a top-left
//! origin so that "below" means a larger `top`.

use std::cmp::Ordering;

/// Axis-aligned rectangle in PDF points, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Convert from PDF's bottom-left origin
    #[must_use]
    pub fn from_pdf_coords(left: f32, bottom: f32, right: f32, top: f32, page_height: f32) -> Self {
        Self {
            left,
            top: page_height - top,
            right,
            bottom: page_height - bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left <= other.right && other.left <= self.right
    }
}

/// A run of text on one line
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub text: String,
    pub bbox: Rect,
}

/// A paragraph-like group of lines
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub bbox: Rect,
}

struct BlockBuilder {
    lines: Vec<String>,
    bbox: Rect,
    last_line: Rect,
}

impl BlockBuilder {
    fn new(segment: &TextSegment) -> Self {
        Self {
            lines: vec![segment.text.clone()],
            bbox: segment.bbox,
            last_line: segment.bbox,
        }
    }

    fn line_height(&self) -> f32 {
        self.last_line.height().max(1.0)
    }

    fn continues_line(&self, segment: &TextSegment) -> bool {
        let line_height = self.line_height();
        (segment.bbox.top - self.last_line.top).abs() <= line_height * 0.5
            && segment.bbox.left >= self.last_line.left
            && segment.bbox.left - self.last_line.right <= line_height * 2.0
    }

    fn starts_next_line(&self, segment: &TextSegment, horizontal_tolerance: f32) -> bool {
        let gap = segment.bbox.top - self.last_line.bottom;
        let below = segment.bbox.top > self.last_line.top;
        below
            && gap <= self.line_height() * 1.5
            && (segment.bbox.overlaps_horizontally(&self.bbox)
                || (segment.bbox.left - self.bbox.left).abs() <= horizontal_tolerance)
    }

    fn push_same_line(&mut self, segment: &TextSegment) {
        if let Some(line) = self.lines.last_mut() {
            line.push(' ');
            line.push_str(&segment.text);
        }
        self.last_line = self.last_line.union(&segment.bbox);
        self.bbox = self.bbox.union(&segment.bbox);
    }

    fn push_new_line(&mut self, segment: &TextSegment) {
        self.lines.push(segment.text.clone());
        self.last_line = segment.bbox;
        self.bbox = self.bbox.union(&segment.bbox);
    }

    fn finish(self) -> TextBlock {
        TextBlock {
            text: self.lines.join("\n"),
            bbox: self.bbox,
        }
    }
}

/// Merge line segments into blocks.
///
/// Segments are visited top-to-bottom, left-to-right. A segment extends the
/// most recent compatible block when it continues that block's last line or
/// starts within 1.5 line heights below it while overlapping the block
/// horizontally (or starting within `horizontal_tolerance` of its left edge).
#[must_use]
pub fn group_into_blocks(mut segments: Vec<TextSegment>, horizontal_tolerance: f32) -> Vec<TextBlock> {
    segments.retain(|s| !s.text.trim().is_empty());
    segments.sort_by(|a, b| {
        match a.bbox.top.partial_cmp(&b.bbox.top).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a
                .bbox
                .left
                .partial_cmp(&b.bbox.left)
                .unwrap_or(Ordering::Equal),
            other => other,
        }
    });

    let mut builders: Vec<BlockBuilder> = Vec::new();
    for segment in &segments {
        if let Some(builder) = builders.iter_mut().rev().find(|b| b.continues_line(segment)) {
            builder.push_same_line(segment);
        } else if let Some(builder) = builders
            .iter_mut()
            .rev()
            .find(|b| b.starts_next_line(segment, horizontal_tolerance))
        {
            builder.push_new_line(segment);
        } else {
            builders.push(BlockBuilder::new(segment));
        }
    }

    builders.into_iter().map(BlockBuilder::finish).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, left: f32, top: f32, right: f32, bottom: f32) -> TextSegment {
        TextSegment {
            text: text.to_string(),
            bbox: Rect::new(left, top, right, bottom),
        }
    }

    #[test]
    fn test_from_pdf_coords_flips_origin() {
        let rect = Rect::from_pdf_coords(10.0, 700.0, 110.0, 750.0, 792.0);
        assert_eq!(rect.top, 42.0);
        assert_eq!(rect.bottom, 92.0);
        assert_eq!(rect.height(), 50.0);
        assert_eq!(rect.width(), 100.0);
    }

    #[test]
    fn test_consecutive_lines_merge_into_one_block() {
        let blocks = group_into_blocks(
            vec![
                seg("Figure 1: Growth of", 72.0, 400.0, 200.0, 410.0),
                seg("the sample over time.", 72.0, 412.0, 210.0, 422.0),
            ],
            100.0,
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Figure 1: Growth of\nthe sample over time.");
        assert_eq!(blocks[0].bbox, Rect::new(72.0, 400.0, 210.0, 422.0));
    }

    #[test]
    fn test_same_line_segments_join_with_space() {
        let blocks = group_into_blocks(
            vec![
                seg("results", 130.0, 100.0, 170.0, 110.0),
                seg("Our", 100.0, 100.0, 125.0, 110.0),
            ],
            100.0,
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Our results");
    }

    #[test]
    fn test_distant_paragraphs_stay_separate() {
        let blocks = group_into_blocks(
            vec![
                seg("First paragraph.", 72.0, 100.0, 300.0, 110.0),
                seg("Second paragraph.", 72.0, 200.0, 300.0, 210.0),
            ],
            100.0,
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_columns_stay_separate() {
        let blocks = group_into_blocks(
            vec![
                seg("left col line 1", 50.0, 100.0, 250.0, 110.0),
                seg("right col line 1", 320.0, 100.0, 520.0, 110.0),
                seg("left col line 2", 50.0, 112.0, 250.0, 122.0),
                seg("right col line 2", 320.0, 112.0, 520.0, 122.0),
            ],
            100.0,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "left col line 1\nleft col line 2");
        assert_eq!(blocks[1].text, "right col line 1\nright col line 2");
    }

    #[test]
    fn test_blank_segments_are_dropped() {
        let blocks = group_into_blocks(vec![seg("   ", 0.0, 0.0, 10.0, 10.0)], 100.0);
        assert!(blocks.is_empty());
    }
}
