use super::{DEFAULT_PREFIX, Extractor, sprite_name};
use crate::config::{ManualRegion, ManualRegions};
use crate::error::Result;
use crate::model::{Rect, SourceImage, Sprite};
use tracing::{debug, trace};

impl Extractor for ManualRegions {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>> {
        Ok(manual_cut(source, &self.regions))
    }
}

/// Clamps a region into a `width x height` sheet.
///
/// `x`/`y` are clamped into `[0, width]`/`[0, height]` and the size is cut so
/// the rectangle never crosses the right or bottom edge. The result may have a
/// zero side.
pub fn clamp_region(region: &ManualRegion, width: u32, height: u32) -> Rect {
    let (sw, sh) = (width as i64, height as i64);
    let x = region.x.clamp(0, sw);
    let y = region.y.clamp(0, sh);
    let w = region.width.min(sw - x).max(0);
    let h = region.height.min(sh - y).max(0);
    Rect::new(x as u32, y as u32, w as u32, h as u32)
}

/// Crops each caller-supplied region, in order.
///
/// Regions are neither deduplicated nor checked for overlap. A supplied name is
/// used verbatim, otherwise `sprite_{index:03}` where `index` is the region's
/// position in `regions`. Regions that clamp to a zero-area rectangle are
/// dropped; any larger minimum size is the caller's business.
pub fn manual_cut(source: &SourceImage, regions: &[ManualRegion]) -> Vec<Sprite> {
    let mut sprites = Vec::with_capacity(regions.len());
    for (i, region) in regions.iter().enumerate() {
        let rect = clamp_region(region, source.width(), source.height());
        if rect.is_empty() {
            trace!(index = i, "skip zero-area region");
            continue;
        }
        let name = region
            .name
            .clone()
            .unwrap_or_else(|| sprite_name(DEFAULT_PREFIX, i));
        sprites.push(Sprite::from_source(source, name, rect));
    }
    debug!(regions = regions.len(), kept = sprites.len(), "manual cut");
    sprites
}
