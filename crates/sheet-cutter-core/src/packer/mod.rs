use crate::error::{CutterError, Result};
use crate::model::{AtlasLayout, Placement, Sprite};
use tracing::{debug, instrument};

pub mod shelf;

pub use shelf::ShelfPacker;

/// A packer places rectangles onto a growing canvas.
///
/// Implementations must ensure no overlaps and keep `padding` pixels between
/// neighbouring placements. Placing fails instead of wrapping around when the
/// canvas coordinates would overflow.
pub trait Packer<K> {
    fn pack(&mut self, key: K, w: u32, h: u32) -> Result<Placement<K>>;
    /// Tight size of everything placed so far.
    fn canvas_size(&self) -> (u32, u32);
}

#[instrument(skip_all, fields(count = items.len(), padding = padding, max_width = max_width))]
/// Packs `(key, width, height)` items into rows no wider than `max_width`.
///
/// Items are placed largest area first (stable for equal areas); the returned
/// placements are in input order. The canvas is the tight bounding box of all
/// placements, never rounded to a power of two.
///
/// Fails with `InvalidArgument` on empty input, a zero `max_width`, a padding
/// wider than `max_width`, or coordinates that overflow `u32`.
pub fn pack_rects<K>(items: Vec<(K, u32, u32)>, padding: u32, max_width: u32) -> Result<AtlasLayout<K>> {
    if items.is_empty() {
        return Err(CutterError::InvalidArgument("nothing to pack".into()));
    }
    if max_width == 0 {
        return Err(CutterError::InvalidArgument("max_width must be positive".into()));
    }
    if padding > max_width {
        return Err(CutterError::InvalidArgument(format!(
            "padding {padding} exceeds max_width {max_width}"
        )));
    }
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        let area_a = items[a].1 as u64 * items[a].2 as u64;
        let area_b = items[b].1 as u64 * items[b].2 as u64;
        area_b.cmp(&area_a)
    });

    let mut packer = ShelfPacker::new(max_width, padding);
    let mut slots: Vec<Option<Placement<K>>> = Vec::with_capacity(items.len());
    slots.resize_with(items.len(), || None);
    let mut items: Vec<Option<(K, u32, u32)>> = items.into_iter().map(Some).collect();
    for idx in order {
        if let Some((key, w, h)) = items[idx].take() {
            slots[idx] = Some(packer.pack(key, w, h)?);
        }
    }
    let (width, height) = packer.canvas_size();
    let placements: Vec<Placement<K>> = slots.into_iter().flatten().collect();
    debug!(width, height, placed = placements.len(), "packed atlas");
    Ok(AtlasLayout {
        width,
        height,
        padding,
        placements,
    })
}

/// Packs sprites by their own size. Placement keys are indices into `sprites`.
pub fn pack(sprites: &[Sprite], padding: u32, max_width: u32) -> Result<AtlasLayout> {
    let items = sprites
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.width(), s.height()))
        .collect();
    pack_rects(items, padding, max_width)
}
