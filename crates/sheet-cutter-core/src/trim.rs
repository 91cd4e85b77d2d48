use crate::alpha::compute_trim_bounds;
use crate::model::{Rect, Sprite};
use image::imageops;

/// Shrinks one sprite to its content. `None` if it is fully transparent.
pub fn trim_sprite(sprite: &Sprite, threshold: u8) -> Option<Sprite> {
    let b = compute_trim_bounds(&sprite.pixels, threshold)?;
    let pixels = imageops::crop_imm(&sprite.pixels, b.x, b.y, b.w, b.h).to_image();
    let rect = Rect::new(sprite.rect.x + b.x, sprite.rect.y + b.y, b.w, b.h);
    Some(Sprite::new(sprite.name.clone(), rect, pixels))
}

/// Returns a trimmed copy of `sprites`, dropping fully transparent ones.
///
/// Names are preserved and the input is left untouched.
pub fn trim(sprites: &[Sprite], threshold: u8) -> Vec<Sprite> {
    sprites
        .iter()
        .filter_map(|s| trim_sprite(s, threshold))
        .collect()
}
