use super::{DEFAULT_PREFIX, Extractor, renumber};
use crate::config::{AutoDetect, Connectivity};
use crate::error::Result;
use crate::model::{Rect, SourceImage, Sprite};
use image::RgbaImage;
use std::collections::VecDeque;
use tracing::{debug, instrument};

static N4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
static N8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Extractor for AutoDetect {
    fn extract(&self, source: &SourceImage) -> Result<Vec<Sprite>> {
        auto_cut(source, self)
    }
}

#[instrument(skip_all, fields(min = p.min_sprite_size, threshold = p.alpha_threshold))]
/// Finds sprites as connected blobs of pixels with alpha `> alpha_threshold`.
///
/// Only outermost blobs count: a blob sitting inside a hole of another blob
/// belongs to its parent. Boxes narrower or shorter than `min_sprite_size` are
/// dropped. Results are ordered top-to-bottom, then left-to-right, and named
/// `sprite_000...` in that order.
pub fn auto_cut(source: &SourceImage, p: &AutoDetect) -> Result<Vec<Sprite>> {
    let mut boxes: Vec<Rect> =
        detect_components(source.rgba(), p.alpha_threshold, p.connectivity)
            .into_iter()
            .filter(|r| r.w >= p.min_sprite_size && r.h >= p.min_sprite_size)
            .collect();
    boxes.sort_by_key(|r| (r.y, r.x));
    debug!(found = boxes.len(), "auto detect");
    let sprites = boxes
        .into_iter()
        .map(|rect| Sprite::from_source(source, String::new(), rect))
        .collect();
    Ok(renumber(sprites, DEFAULT_PREFIX))
}

/// Bounding boxes of the external connected components of the alpha mask,
/// in discovery (row-major) order.
pub fn detect_components(rgba: &RgbaImage, threshold: u8, connectivity: Connectivity) -> Vec<Rect> {
    let (w, h) = rgba.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let mask: Vec<bool> = rgba.pixels().map(|p| p[3] > threshold).collect();
    let (fg_offsets, bg_offsets): (&[(i64, i64)], &[(i64, i64)]) = match connectivity {
        Connectivity::Eight => (&N8[..], &N4[..]),
        Connectivity::Four => (&N4[..], &N8[..]),
    };

    // Label foreground components. 0 = unlabeled, ids start at 1.
    let mut labels = vec![0u32; wu * hu];
    let mut boxes: Vec<Rect> = Vec::new();
    let mut queue = VecDeque::new();
    for start in 0..wu * hu {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        let id = boxes.len() as u32 + 1;
        labels[start] = id;
        queue.push_back(start);
        let (mut x1, mut y1, mut x2, mut y2) = (w, h, 0u32, 0u32);
        while let Some(idx) = queue.pop_front() {
            let (x, y) = ((idx % wu) as u32, (idx / wu) as u32);
            x1 = x1.min(x);
            y1 = y1.min(y);
            x2 = x2.max(x);
            y2 = y2.max(y);
            for n in neighbours(x, y, w, h, fg_offsets) {
                if mask[n] && labels[n] == 0 {
                    labels[n] = id;
                    queue.push_back(n);
                }
            }
        }
        boxes.push(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1));
    }

    // Background reachable from outside the image, with the dual connectivity.
    let mut outer = vec![false; wu * hu];
    for idx in 0..wu * hu {
        let (x, y) = (idx % wu, idx / wu);
        let on_border = x == 0 || y == 0 || x + 1 == wu || y + 1 == hu;
        if on_border && !mask[idx] {
            outer[idx] = true;
            queue.push_back(idx);
        }
    }
    while let Some(idx) = queue.pop_front() {
        let (x, y) = ((idx % wu) as u32, (idx / wu) as u32);
        for n in neighbours(x, y, w, h, bg_offsets) {
            if !mask[n] && !outer[n] {
                outer[n] = true;
                queue.push_back(n);
            }
        }
    }

    // A component is external if it touches the image edge or the outer background.
    let mut external = vec![false; boxes.len()];
    for idx in 0..wu * hu {
        let id = labels[idx];
        if id == 0 || external[id as usize - 1] {
            continue;
        }
        let (x, y) = (idx % wu, idx / wu);
        let on_border = x == 0 || y == 0 || x + 1 == wu || y + 1 == hu;
        if on_border || neighbours(x as u32, y as u32, w, h, &N4).any(|n| outer[n]) {
            external[id as usize - 1] = true;
        }
    }

    boxes
        .into_iter()
        .zip(external)
        .filter_map(|(r, ext)| ext.then_some(r))
        .collect()
}

fn neighbours<'a>(
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    offsets: &'a [(i64, i64)],
) -> impl Iterator<Item = usize> + 'a {
    offsets.iter().filter_map(move |&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
            None
        } else {
            Some(ny as usize * w as usize + nx as usize)
        }
    })
}
