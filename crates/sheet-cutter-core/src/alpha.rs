//! Alpha-channel analysis: emptiness checks and tight content bounds.

use crate::model::Rect;
use image::{DynamicImage, RgbaImage};

/// True iff every pixel's alpha is `<= threshold`.
pub fn is_empty(region: &RgbaImage, threshold: u8) -> bool {
    region.pixels().all(|p| p[3] <= threshold)
}

/// Like [`is_empty`], but images without an alpha channel are never empty.
pub fn is_empty_image(region: &DynamicImage, threshold: u8) -> bool {
    if !region.color().has_alpha() {
        return false;
    }
    is_empty(&region.to_rgba8(), threshold)
}

/// Tight bounding box of pixels with alpha `> threshold`, relative to the
/// region's own origin. The box covers `[x, x + w)` and `[y, y + h)`.
///
/// Returns `None` when no pixel exceeds the threshold.
pub fn compute_trim_bounds(region: &RgbaImage, threshold: u8) -> Option<Rect> {
    let (w, h) = region.dimensions();
    let opaque = |x: u32, y: u32| region.get_pixel(x, y)[3] > threshold;
    let column_clear = |x: u32, y1: u32, y2: u32| (y1..=y2).all(|y| !opaque(x, y));
    let row_clear = |y: u32, x1: u32, x2: u32| (x1..=x2).all(|x| !opaque(x, y));

    if w == 0 || h == 0 {
        return None;
    }
    let mut x1 = 0;
    while x1 < w && column_clear(x1, 0, h - 1) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    let mut x2 = w - 1;
    while x2 > x1 && column_clear(x2, 0, h - 1) {
        x2 -= 1;
    }
    let mut y1 = 0;
    while y1 < h && row_clear(y1, x1, x2) {
        y1 += 1;
    }
    let mut y2 = h - 1;
    while y2 > y1 && row_clear(y2, x1, x2) {
        y2 -= 1;
    }
    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}
