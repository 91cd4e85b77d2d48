use super::{DEFAULT_PREFIX, Extractor, renumber};
use crate::alpha::is_empty;
use crate::config::{GridByCount, GridBySize};
use crate::error::Result;
use crate::model::{Rect, SourceImage, Sprite};
use tracing::{debug, instrument, trace};

impl Extractor for GridBySize {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>> {
        grid_cut_by_size(source, self)
    }
}

impl Extractor for GridByCount {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>> {
        grid_cut_by_count(source, self)
    }
}

/// Cells of a regular grid that fit entirely inside `width x height`, row-major.
///
/// Trailing partial cells are dropped rather than truncated.
pub fn grid_cells(width: u32, height: u32, p: &GridBySize) -> Vec<Rect> {
    let (cw, ch) = (p.cell_width as u64, p.cell_height as u64);
    if cw == 0 || ch == 0 {
        return Vec::new();
    }
    let step_x = cw + p.padding_x as u64;
    let step_y = ch + p.padding_y as u64;
    let mut cells = Vec::new();
    let mut y = p.offset_y as u64;
    while y + ch <= height as u64 {
        let mut x = p.offset_x as u64;
        while x + cw <= width as u64 {
            cells.push(Rect::new(x as u32, y as u32, p.cell_width, p.cell_height));
            x += step_x;
        }
        y += step_y;
    }
    cells
}

#[instrument(skip_all, fields(cell_w = p.cell_width, cell_h = p.cell_height))]
/// Cuts the sheet along a fixed-size grid, skipping cells that are fully transparent.
///
/// Surviving cells are named `sprite_000`, `sprite_001`, ... in scan order.
pub fn grid_cut_by_size(source: &SourceImage, p: &GridBySize) -> Result<Vec<Sprite>> {
    p.validate()?;
    let cells = grid_cells(source.width(), source.height(), p);
    let total = cells.len();
    let mut sprites = Vec::with_capacity(total);
    for rect in cells {
        let pixels = source.crop(&rect);
        if source.has_alpha() && is_empty(&pixels, p.alpha_threshold) {
            trace!(x = rect.x, y = rect.y, "skip empty cell");
            continue;
        }
        sprites.push(Sprite::new(String::new(), rect, pixels));
    }
    debug!(cells = total, kept = sprites.len(), "grid cut");
    Ok(renumber(sprites, DEFAULT_PREFIX))
}

/// Derives the cell size from row/column counts, then cuts with offset (0, 0).
pub fn grid_cut_by_count(source: &SourceImage, p: &GridByCount) -> Result<Vec<Sprite>> {
    let by_size = p.to_grid_by_size(source.width(), source.height())?;
    debug!(
        rows = p.rows,
        cols = p.cols,
        cell_w = by_size.cell_width,
        cell_h = by_size.cell_height,
        "derived grid cell size"
    );
    grid_cut_by_size(source, &by_size)
}
