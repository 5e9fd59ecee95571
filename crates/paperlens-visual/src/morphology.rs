//! Binary image operations on top of `imageproc`
//!
//! Foreground pixels are 255, background 0. Rectangular openings run
//! through `grayscale_erode`/`grayscale_dilate` with explicit-anchor masks.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::filter::box_filter;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

const FOREGROUND: u8 = 255;

/// Invert, then mark pixels brighter than their local mean plus `offset`.
///
/// `block_size` is the side of the square neighbourhood (odd). Dark strokes
/// on a light background become foreground.
#[must_use]
pub fn adaptive_threshold_inverted(gray: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    let mut inverted = gray.clone();
    image::imageops::invert(&mut inverted);
    let radius = block_size / 2;
    let mean = box_filter(&inverted, radius, radius);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = i16::from(inverted.get_pixel(x, y).0[0]);
        let local = i16::from(mean.get_pixel(x, y).0[0]);
        if value > local + offset {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Foreground where `gray <= threshold`
#[must_use]
pub fn threshold_binary_inverted(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > threshold {
            Luma([0])
        } else {
            Luma([FOREGROUND])
        }
    })
}

/// Largest mask side `Mask::from_image` accepts
const MAX_MASK_SIDE: u32 = 511;

/// Solid `width` x `height` mask with its anchor at `anchor(side)` on both axes
fn rect_mask(width: u32, height: u32, anchor: fn(u32) -> u32) -> Mask {
    let width = width.clamp(1, MAX_MASK_SIDE);
    let height = height.clamp(1, MAX_MASK_SIDE);
    let kernel = GrayImage::from_pixel(width, height, Luma([FOREGROUND]));
    let center = |side: u32| u8::try_from(anchor(side)).unwrap_or(u8::MAX);
    Mask::from_image(&kernel, center(width), center(height))
}

/// Erode `iterations` times then dilate `iterations` times with a
/// `kernel_width` x `kernel_height` rectangle.
///
/// Erosion anchors the rectangle at `side / 2`. Dilation uses the reflected
/// anchor so the opening restores the extent of whatever survives erosion.
/// Pixels outside the image never influence the result.
#[must_use]
pub fn open_rect(src: &GrayImage, kernel_width: u32, kernel_height: u32, iterations: u32) -> GrayImage {
    let erode_mask = rect_mask(kernel_width, kernel_height, |side| side / 2);
    let dilate_mask = rect_mask(kernel_width, kernel_height, |side| side - 1 - side / 2);

    let mut image = src.clone();
    for _ in 0..iterations {
        image = grayscale_erode(&image, &erode_mask);
    }
    for _ in 0..iterations {
        image = grayscale_dilate(&image, &dilate_mask);
    }
    image
}

/// Outer borders of top-level components only
#[must_use]
pub fn count_external_contours(binary: &GrayImage) -> usize {
    find_contours::<i32>(binary)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .count()
}

/// Every border, outer and hole, at any nesting depth
#[must_use]
pub fn count_all_contours(binary: &GrayImage) -> usize {
    find_contours::<i32>(binary).len()
}

/// Inclusive-pixel bounding box of a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    fn of(contour: &Contour<i32>) -> Option<Self> {
        let min_x = contour.points.iter().map(|p| p.x).min()?;
        let max_x = contour.points.iter().map(|p| p.x).max()?;
        let min_y = contour.points.iter().map(|p| p.y).min()?;
        let max_y = contour.points.iter().map(|p| p.y).max()?;
        Some(Self {
            x: u32::try_from(min_x).ok()?,
            y: u32::try_from(min_y).ok()?,
            width: u32::try_from(max_x - min_x + 1).ok()?,
            height: u32::try_from(max_y - min_y + 1).ok()?,
        })
    }
}

/// Bounding boxes of all contours, sorted by (top, left)
#[must_use]
pub fn contour_bounding_boxes(binary: &GrayImage) -> Vec<BoundingBox> {
    let mut boxes: Vec<BoundingBox> = find_contours::<i32>(binary)
        .iter()
        .filter_map(BoundingBox::of)
        .collect();
    boxes.sort_by_key(|b| (b.y, b.x));
    boxes
}
