use crate::error::Result;
use image::{DynamicImage, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// True if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x >= other.x + other.w
            || other.x >= self.x + self.w
            || self.y >= other.y + other.h
            || other.y >= self.y + self.h)
    }
}

/// Decoded sprite sheet. Pixels are always stored as RGBA8; `has_alpha`
/// remembers whether the file carried an alpha channel at all.
#[derive(Debug, Clone)]
pub struct SourceImage {
    rgba: RgbaImage,
    has_alpha: bool,
}

impl SourceImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_dynamic(img))
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        Self {
            rgba: img.to_rgba8(),
            has_alpha,
        }
    }

    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self {
            rgba,
            has_alpha: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Owned copy of `rect`. The caller guarantees `rect` lies inside the image.
    pub fn crop(&self, rect: &Rect) -> RgbaImage {
        imageops::crop_imm(&self.rgba, rect.x, rect.y, rect.w, rect.h).to_image()
    }
}

/// One extracted region of a sheet.
///
/// `rect` is in source-image coordinates; `pixels` is an owned copy of that
/// region with the same width/height.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub rect: Rect,
    pub pixels: RgbaImage,
}

impl Sprite {
    pub fn new(name: impl Into<String>, rect: Rect, pixels: RgbaImage) -> Self {
        Self {
            name: name.into(),
            rect,
            pixels,
        }
    }

    /// Crops `rect` out of `source`.
    pub fn from_source(source: &SourceImage, name: impl Into<String>, rect: Rect) -> Self {
        Self::new(name, rect, source.crop(&rect))
    }

    pub fn x(&self) -> u32 {
        self.rect.x
    }
    pub fn y(&self) -> u32 {
        self.rect.y
    }
    pub fn width(&self) -> u32 {
        self.rect.w
    }
    pub fn height(&self) -> u32 {
        self.rect.h
    }
}

/// A packed position within an atlas canvas. `frame.w/h` equal the packed
/// item's own size; padding is spacing only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement<K = usize> {
    pub key: K,
    pub frame: Rect,
}

/// Result of a packing run: placements in input order and the tight canvas size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasLayout<K = usize> {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub placements: Vec<Placement<K>>,
}

impl<K> AtlasLayout<K> {
    /// Fraction of the canvas covered by placed frames (0.0 to 1.0).
    pub fn occupancy(&self) -> f64 {
        let total = (self.width as u64) * (self.height as u64);
        if total == 0 {
            return 0.0;
        }
        let used: u64 = self.placements.iter().map(|p| p.frame.area()).sum();
        used as f64 / total as f64
    }
}
