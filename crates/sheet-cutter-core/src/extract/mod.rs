use crate::config::{ExtractMode, ManualRegion};
use crate::error::Result;
use crate::model::{SourceImage, Sprite};

pub mod auto;
pub mod grid;
pub mod manual;

/// Name prefix used by the built-in strategies.
pub const DEFAULT_PREFIX: &str = "sprite_";

/// An extractor turns a source sheet into an ordered list of sprites.
///
/// Implementations never mutate the source; every returned sprite owns a
/// copy of its pixels and lies fully inside the source bounds.
pub trait Extractor {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>>;
}

impl Extractor for ExtractMode {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>> {
        match self {
            ExtractMode::GridBySize(p) => p.extract(source),
            ExtractMode::GridByCount(p) => p.extract(source),
            ExtractMode::AutoDetect(p) => p.extract(source),
            ExtractMode::Manual(p) => p.extract(source),
        }
    }
}

/// Renames sprites to `{prefix}{index:03}` in their current order.
pub fn renumber(sprites: Vec<Sprite>, prefix: &str) -> Vec<Sprite> {
    sprites
        .into_iter()
        .enumerate()
        .map(|(i, mut s)| {
            s.name = sprite_name(prefix, i);
            s
        })
        .collect()
}

pub fn sprite_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{index:03}")
}

/// Keeps regions whose width and height are both strictly greater than `min`.
///
/// The manual extractor accepts any rectangle; front-ends that let users draw
/// regions apply this first (with [`crate::config::MANUAL_MIN_SIZE`]) to drop
/// accidental clicks.
pub fn retain_min_size(regions: Vec<ManualRegion>, min: u32) -> Vec<ManualRegion> {
    let min = min as i64;
    regions
        .into_iter()
        .filter(|r| r.width > min && r.height > min)
        .collect()
}
