//! Core library for cutting sprite sheets.
//!
//! - Extraction: fixed-size grid, row/column grid, connected-component auto-detection, manual regions
//! - Alpha analysis: emptiness checks and trimming to non-transparent content
//! - Packing: deterministic shelf packer bounded by a maximum width
//! - Export: individual files or one atlas, each with a `metadata.json`
//! - Animation: read an exported atlas back, group frames into actions, write an animation config
//!
//! Quick example:
//! ```ignore
//! use sheet_cutter_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let mut session = CutterSession::new();
//! session.load_image("sheet.png")?;
//! session.grid_cut_by_size(&GridBySize::new(32, 32))?;
//! session.select_all();
//! let cfg = ExportConfig::Atlas(AtlasExportConfig::builder().padding(2).build());
//! let meta = session.export("out", &cfg)?;
//! println!("sprites: {}", meta.sprite_count());
//! # Ok(()) }
//! ```

pub mod alpha;
pub mod animation;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod packer;
pub mod session;
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use session::*;

/// Convenience prelude for common types and functions.
/// Importing `sheet_cutter_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::alpha::{compute_trim_bounds, is_empty};
    pub use crate::animation::{ActionSet, AnimationConfig, AtlasDocument, FrameCell, derive_frames};
    pub use crate::config::{
        AtlasExportConfig, AutoDetect, Connectivity, ExportConfig, ExportMode, ExtractMode,
        GridByCount, GridBySize, ImageFormat, IndividualExportConfig, ManualRegion, ManualRegions,
    };
    pub use crate::error::{CutterError, Result};
    pub use crate::export::{AtlasMetadata, ExportMetadata, IndividualMetadata, export};
    pub use crate::extract::{Extractor, renumber, retain_min_size};
    pub use crate::model::{AtlasLayout, Placement, Rect, SourceImage, Sprite};
    pub use crate::packer::{Packer, ShelfPacker, pack, pack_rects};
    pub use crate::session::CutterSession;
    pub use crate::trim::trim;
}
