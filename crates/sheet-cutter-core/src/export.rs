//! Export serializer: writes sprites as individual files or as one packed
//! atlas, plus a `metadata.json` describing what was written.
//!
//! The metadata schema is the contract downstream tools read:
//!
//! ```json
//! { "export_mode": "atlas", "atlas_name": "atlas", "atlas_file": "atlas.png",
//!   "atlas_size": { "width": 130, "height": 64 }, "sprite_count": 2, "sprite_padding": 2,
//!   "sprites": [ { "name": "sprite_000", "frame": { "x": 0, "y": 0, "width": 64, "height": 64 } } ] }
//! ```

use crate::compositing::compose_atlas;
use crate::config::{AtlasExportConfig, ExportConfig, ExportMode, ImageFormat, IndividualExportConfig, METADATA_FILE};
use crate::error::{CutterError, Result};
use crate::extract::sprite_name;
use crate::model::{AtlasLayout, Rect, Sprite};
use crate::packer::pack;
use crate::trim::trim;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Frame rectangle as written to metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<Rect> for FrameRect {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.w,
            height: r.h,
        }
    }
}

impl From<FrameRect> for Rect {
    fn from(f: FrameRect) -> Self {
        Rect::new(f.x, f.y, f.width, f.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndividualSpriteEntry {
    pub index: usize,
    pub name: String,
    pub file: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasSpriteEntry {
    pub name: String,
    pub frame: FrameRect,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndividualMetadata {
    pub sprite_count: usize,
    pub sprites: Vec<IndividualSpriteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasMetadata {
    pub atlas_name: String,
    pub atlas_file: String,
    pub atlas_size: AtlasSize,
    pub sprite_count: usize,
    #[serde(default)]
    pub sprite_padding: u32,
    pub sprites: Vec<AtlasSpriteEntry>,
}

/// Record of one export call, tagged by `export_mode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "export_mode", rename_all = "lowercase")]
pub enum ExportMetadata {
    Individual(IndividualMetadata),
    Atlas(AtlasMetadata),
}

impl ExportMetadata {
    pub fn mode(&self) -> ExportMode {
        match self {
            Self::Individual(_) => ExportMode::Individual,
            Self::Atlas(_) => ExportMode::Atlas,
        }
    }

    pub fn sprite_count(&self) -> usize {
        match self {
            Self::Individual(m) => m.sprite_count,
            Self::Atlas(m) => m.sprite_count,
        }
    }

    /// Parses metadata, rejecting unknown `export_mode` values with `InvalidMode`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        let mode = value
            .get("export_mode")
            .and_then(Value::as_str)
            .unwrap_or_default();
        mode.parse::<ExportMode>()?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Writes pretty-printed JSON to `dir/metadata.json`, replacing any existing file.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(METADATA_FILE);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text)?;
        Ok(path)
    }
}

/// Serialize metadata as a JSON value, for callers that post-process it.
pub fn to_json(meta: &ExportMetadata) -> Result<Value> {
    Ok(serde_json::to_value(meta)?)
}

/// In-memory atlas: composed RGBA image, packer layout and metadata.
pub struct AtlasOutput {
    pub metadata: AtlasMetadata,
    pub layout: AtlasLayout,
    pub rgba: RgbaImage,
}

/// Saves `rgba` with `format`. Lossy formats silently drop the alpha channel.
pub fn save_image(rgba: &RgbaImage, path: &Path, format: ImageFormat) -> Result<()> {
    if format.supports_alpha() {
        rgba.save_with_format(path, format.to_image_format())?;
    } else {
        let rgb = DynamicImage::ImageRgba8(rgba.clone()).to_rgb8();
        rgb.save_with_format(path, format.to_image_format())?;
    }
    Ok(())
}

/// File name of the `index`-th individually exported sprite.
pub fn individual_file_name(cfg: &IndividualExportConfig, index: usize) -> String {
    format!("{}.{}", sprite_name(&cfg.prefix, index), cfg.format.extension())
}

#[instrument(skip_all, fields(count = sprites.len()))]
/// Writes each sprite to `out_dir/{prefix}{index:03}.{ext}`.
///
/// Not transactional: files written before a failure stay on disk.
pub fn write_individual(
    sprites: &[Sprite],
    out_dir: &Path,
    cfg: &IndividualExportConfig,
) -> Result<IndividualMetadata> {
    let mut entries = Vec::with_capacity(sprites.len());
    for (index, sprite) in sprites.iter().enumerate() {
        let file = individual_file_name(cfg, index);
        save_image(&sprite.pixels, &out_dir.join(&file), cfg.format)?;
        debug!(%file, name = %sprite.name, "wrote sprite");
        entries.push(IndividualSpriteEntry {
            index,
            name: sprite.name.clone(),
            file,
            width: sprite.width(),
            height: sprite.height(),
        });
    }
    Ok(IndividualMetadata {
        sprite_count: entries.len(),
        sprites: entries,
    })
}

/// Packs and composes an atlas without touching the filesystem.
///
/// `sprites[]` in the metadata follow the input order; frames are in atlas space.
pub fn build_atlas(sprites: &[Sprite], cfg: &AtlasExportConfig) -> Result<AtlasOutput> {
    let layout = pack(sprites, cfg.padding, cfg.max_width)?;
    let rgba = compose_atlas(sprites, &layout);
    let entries = layout
        .placements
        .iter()
        .map(|p| AtlasSpriteEntry {
            name: sprites[p.key].name.clone(),
            frame: p.frame.into(),
        })
        .collect::<Vec<_>>();
    let metadata = AtlasMetadata {
        atlas_name: cfg.name.clone(),
        atlas_file: cfg.file_name(),
        atlas_size: AtlasSize {
            width: layout.width,
            height: layout.height,
        },
        sprite_count: entries.len(),
        sprite_padding: cfg.padding,
        sprites: entries,
    };
    Ok(AtlasOutput {
        metadata,
        layout,
        rgba,
    })
}

#[instrument(skip_all, fields(count = sprites.len()))]
/// Builds the atlas and writes `out_dir/{name}.{ext}`.
pub fn write_atlas(sprites: &[Sprite], out_dir: &Path, cfg: &AtlasExportConfig) -> Result<AtlasOutput> {
    let out = build_atlas(sprites, cfg)?;
    save_image(&out.rgba, &out_dir.join(&out.metadata.atlas_file), cfg.format)?;
    debug!(
        file = %out.metadata.atlas_file,
        width = out.layout.width,
        height = out.layout.height,
        "wrote atlas"
    );
    Ok(out)
}

/// Exports `sprites` according to `cfg` and writes `metadata.json`.
///
/// Creates `out_dir` if needed and overwrites files with the same names.
/// Fails with `NoSprites` if there is nothing to write (also after trimming).
pub fn export(sprites: &[Sprite], out_dir: impl AsRef<Path>, cfg: &ExportConfig) -> Result<ExportMetadata> {
    cfg.validate()?;
    if sprites.is_empty() {
        return Err(CutterError::NoSprites);
    }
    let trimmed;
    let sprites = match cfg.trim_threshold() {
        Some(threshold) => {
            trimmed = trim(sprites, threshold);
            if trimmed.is_empty() {
                return Err(CutterError::NoSprites);
            }
            &trimmed[..]
        }
        None => sprites,
    };
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let meta = match cfg {
        ExportConfig::Individual(c) => ExportMetadata::Individual(write_individual(sprites, out_dir, c)?),
        ExportConfig::Atlas(c) => ExportMetadata::Atlas(write_atlas(sprites, out_dir, c)?.metadata),
    };
    let path = meta.write(out_dir)?;
    info!(
        mode = meta.mode().as_str(),
        sprites = meta.sprite_count(),
        metadata = %path.display(),
        "export complete"
    );
    Ok(meta)
}
