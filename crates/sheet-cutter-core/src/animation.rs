//! Consumer side of atlas metadata: derive a frame grid from an exported
//! atlas, group frames into named actions and write an animation config.

use crate::compositing::crop_frame;
use crate::config::{ExportMode, METADATA_FILE};
use crate::error::{CutterError, Result};
use crate::export::{AtlasMetadata, ExportMetadata};
use crate::model::Rect;
use image::RgbaImage;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ANIMATION_CONFIG_FILE: &str = "animation_config.json";
pub const DEFAULT_FRAME_RATE: u32 = 12;

/// One atlas frame with its derived grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCell {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub rect: Rect,
}

/// Grid cells for every `sprites[]` entry: `col = x / (width + padding)`,
/// `row = y / (height + padding)`. Zero-size frames fall back to row 0,
/// column = entry index.
pub fn derive_frames(meta: &AtlasMetadata) -> Vec<FrameCell> {
    let pad = meta.sprite_padding;
    meta.sprites
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let rect: Rect = s.frame.into();
            let (row, col) = if rect.w > 0 && rect.h > 0 {
                (rect.y / (rect.h + pad), rect.x / (rect.w + pad))
            } else {
                (0, index as u32)
            };
            FrameCell {
                index,
                row,
                col,
                rect,
            }
        })
        .collect()
}

/// An exported atlas loaded back from its directory.
#[derive(Debug, Clone)]
pub struct AtlasDocument {
    pub dir: PathBuf,
    pub metadata: AtlasMetadata,
    pub atlas: RgbaImage,
    pub frames: Vec<FrameCell>,
}

impl AtlasDocument {
    /// Reads `dir/metadata.json` and the atlas image it references.
    ///
    /// Metadata written in individual mode is rejected with `InvalidMode`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let metadata = match ExportMetadata::read(dir.join(METADATA_FILE))? {
            ExportMetadata::Atlas(m) => m,
            ExportMetadata::Individual(_) => {
                return Err(CutterError::InvalidMode(ExportMode::Individual.as_str().into()));
            }
        };
        let atlas = image::open(dir.join(&metadata.atlas_file))?.to_rgba8();
        let frames = derive_frames(&metadata);
        info!(
            atlas = %metadata.atlas_name,
            width = atlas.width(),
            height = atlas.height(),
            frames = frames.len(),
            "loaded atlas"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            metadata,
            atlas,
            frames,
        })
    }

    /// Pixels of frame `index`, cropped from the atlas.
    pub fn frame_image(&self, index: usize) -> Option<RgbaImage> {
        let cell = self.frames.get(index)?;
        crop_frame(&self.atlas, &cell.rect)
    }
}

/// A named animation: the grid cells of its frames, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGroup {
    pub name: String,
    pub frames: Vec<(u32, u32)>,
}

impl ActionGroup {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Insertion-ordered collection of action groups with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    groups: Vec<ActionGroup>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action made of `frame_indices` (sorted by frame index).
    ///
    /// Fails with `InvalidParameter` on an empty or duplicate name, an empty
    /// selection or an index outside `frames`.
    pub fn add(&mut self, name: &str, frame_indices: &[usize], frames: &[FrameCell]) -> Result<&ActionGroup> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CutterError::InvalidParameter("action name must not be empty".into()));
        }
        if self.get(name).is_some() {
            return Err(CutterError::InvalidParameter(format!("action '{name}' already exists")));
        }
        if frame_indices.is_empty() {
            return Err(CutterError::InvalidParameter(format!("action '{name}' has no frames")));
        }
        let mut picked = Vec::with_capacity(frame_indices.len());
        for &i in frame_indices {
            let cell = frames.get(i).ok_or_else(|| {
                CutterError::InvalidParameter(format!("frame {i} out of range (0..{})", frames.len()))
            })?;
            picked.push(cell);
        }
        picked.sort_by_key(|c| c.index);
        let group = ActionGroup {
            name: name.to_string(),
            frames: picked.iter().map(|c| (c.row, c.col)).collect(),
        };
        debug!(action = %group.name, frames = group.frame_count(), "added action");
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        before != self.groups.len()
    }

    pub fn get(&self, name: &str) -> Option<&ActionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Frames of an action, resolved through their grid cells.
    pub fn cells_for<'a>(&self, name: &str, frames: &'a [FrameCell]) -> Vec<&'a FrameCell> {
        let Some(group) = self.get(name) else {
            return Vec::new();
        };
        group
            .frames
            .iter()
            .flat_map(move |&(row, col)| frames.iter().filter(move |f| f.row == row && f.col == col))
            .collect()
    }
}

#[derive(Serialize)]
struct ActionEntry<'a> {
    frames: &'a [(u32, u32)],
    frame_count: usize,
}

impl Serialize for ActionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for g in &self.groups {
            map.serialize_entry(
                &g.name,
                &ActionEntry {
                    frames: &g.frames,
                    frame_count: g.frame_count(),
                },
            )?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpriteInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub scale_ratio: f32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub padding: u32,
}

/// Simplified animation description written next to an atlas.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnimationConfig {
    pub sprite_info: SpriteInfo,
    pub layout: GridLayout,
    pub actions: ActionSet,
    pub frame_rate: u32,
}

impl AnimationConfig {
    /// Assembles the config. Sprite size is taken from the first frame, the
    /// grid extent from the largest row/column seen.
    pub fn build(
        meta: &AtlasMetadata,
        frames: &[FrameCell],
        actions: &ActionSet,
        frame_rate: u32,
        scale_ratio: f32,
    ) -> Result<Self> {
        if actions.is_empty() {
            return Err(CutterError::InvalidParameter("no actions to export".into()));
        }
        if frame_rate == 0 {
            return Err(CutterError::InvalidParameter("frame_rate must be positive".into()));
        }
        let (width, height) = frames.first().map(|f| (f.rect.w, f.rect.h)).unwrap_or((0, 0));
        let columns = frames.iter().map(|f| f.col).max().unwrap_or(0) + 1;
        let rows = frames.iter().map(|f| f.row).max().unwrap_or(0) + 1;
        Ok(Self {
            sprite_info: SpriteInfo {
                name: meta.atlas_name.clone(),
                width,
                height,
                scale_ratio,
            },
            layout: GridLayout {
                columns,
                rows,
                padding: meta.sprite_padding,
            },
            actions: actions.clone(),
            frame_rate,
        })
    }

    /// Writes `dir/animation_config.json`, replacing any existing file.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(ANIMATION_CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}
