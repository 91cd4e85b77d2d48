use crate::model::{AtlasLayout, Rect, Sprite};
use image::{Rgba, RgbaImage, imageops};

/// Copy all of `src` into `canvas` with its top-left at (dx, dy).
///
/// Pixels are replaced, not blended; anything falling outside the canvas is clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Draws every sprite at its placement on a fully transparent canvas.
///
/// `layout` keys index into `sprites`; keys without a sprite are ignored.
pub fn compose_atlas(sprites: &[Sprite], layout: &AtlasLayout) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, Rgba([0, 0, 0, 0]));
    for p in &layout.placements {
        if let Some(sprite) = sprites.get(p.key) {
            blit_rgba(&sprite.pixels, &mut canvas, p.frame.x, p.frame.y);
        }
    }
    canvas
}

/// Cuts one frame back out of an atlas. `None` if the frame leaves the image.
pub fn crop_frame(atlas: &RgbaImage, frame: &Rect) -> Option<RgbaImage> {
    let (w, h) = atlas.dimensions();
    if frame.x as u64 + frame.w as u64 > w as u64 || frame.y as u64 + frame.h as u64 > h as u64 {
        return None;
    }
    Some(imageops::crop_imm(atlas, frame.x, frame.y, frame.w, frame.h).to_image())
}
