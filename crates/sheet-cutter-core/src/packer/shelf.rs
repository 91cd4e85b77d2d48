use super::Packer;
use crate::error::{CutterError, Result};
use crate::model::{Placement, Rect};

/// Row-based shelf packer.
///
/// Items fill the current row left to right; when the next item would cross
/// `max_width` a new row starts below the tallest item of the current one
/// (plus padding). An item wider than `max_width` still lands at `x = 0` on a
/// row of its own. Placing an item whose position, size and padding no longer
/// fit in `u32` fails with `InvalidArgument` and leaves the packer unchanged.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    max_width: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    extent: (u32, u32),
}

impl ShelfPacker {
    pub fn new(max_width: u32, padding: u32) -> Self {
        Self {
            max_width,
            padding,
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            extent: (0, 0),
        }
    }

    /// Tight size of everything placed so far.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.extent
    }
}

impl<K> Packer<K> for ShelfPacker {
    fn pack(&mut self, key: K, w: u32, h: u32) -> Result<Placement<K>> {
        let padding = self.padding;
        let overflow =
            move || CutterError::InvalidArgument(format!("{w}x{h} item with padding {padding} overflows the atlas"));

        let wraps = self.cursor_x > 0 && self.cursor_x.checked_add(w).is_none_or(|r| r > self.max_width);
        let (x, y, row_height) = if wraps {
            (0, self.cursor_y.checked_add(self.row_height).ok_or_else(overflow)?, 0)
        } else {
            (self.cursor_x, self.cursor_y, self.row_height)
        };
        let right = x.checked_add(w).ok_or_else(overflow)?;
        let bottom = y.checked_add(h).ok_or_else(overflow)?;
        let next_x = right.checked_add(padding).ok_or_else(overflow)?;
        let padded_h = h.checked_add(padding).ok_or_else(overflow)?;

        self.cursor_x = next_x;
        self.cursor_y = y;
        self.row_height = row_height.max(padded_h);
        self.extent.0 = self.extent.0.max(right);
        self.extent.1 = self.extent.1.max(bottom);
        Ok(Placement {
            key,
            frame: Rect::new(x, y, w, h),
        })
    }

    fn canvas_size(&self) -> (u32, u32) {
        ShelfPacker::canvas_size(self)
    }
}
