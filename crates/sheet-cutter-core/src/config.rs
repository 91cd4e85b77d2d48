use crate::error::{CutterError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Alpha values `<=` this are treated as transparent unless a caller overrides it.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 10;
/// Default atlas width bound for the shelf packer.
pub const DEFAULT_MAX_WIDTH: u32 = 2048;
/// Default gap between packed atlas frames.
pub const DEFAULT_ATLAS_PADDING: u32 = 2;
/// Minimum side length (exclusive) a hand-drawn region must exceed before it is
/// handed to the manual extractor. Enforced by callers, see `retain_min_size`.
pub const MANUAL_MIN_SIZE: u32 = 5;
/// Metadata file written next to exported images.
pub const METADATA_FILE: &str = "metadata.json";

/// Regular grid stepping by `cell + padding` from an offset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridBySize {
    pub cell_width: u32,
    pub cell_height: u32,
    #[serde(default)]
    pub padding_x: u32,
    #[serde(default)]
    pub padding_y: u32,
    #[serde(default)]
    pub offset_x: u32,
    #[serde(default)]
    pub offset_y: u32,
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
}

impl GridBySize {
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
            padding_x: 0,
            padding_y: 0,
            offset_x: 0,
            offset_y: 0,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
    pub fn with_padding(mut self, x: u32, y: u32) -> Self {
        self.padding_x = x;
        self.padding_y = y;
        self
    }
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }
    pub fn with_alpha_threshold(mut self, t: u8) -> Self {
        self.alpha_threshold = t;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(CutterError::InvalidParameter(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        Ok(())
    }
}

/// Grid described by row/column counts; cell size is derived from the sheet size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridByCount {
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub padding_x: u32,
    #[serde(default)]
    pub padding_y: u32,
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
}

impl GridByCount {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            padding_x: 0,
            padding_y: 0,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
    pub fn with_padding(mut self, x: u32, y: u32) -> Self {
        self.padding_x = x;
        self.padding_y = y;
        self
    }
    pub fn with_alpha_threshold(mut self, t: u8) -> Self {
        self.alpha_threshold = t;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CutterError::InvalidParameter(format!(
                "rows and cols must be positive, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Floor-divided cell size for a `width x height` sheet.
    pub fn cell_size(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        self.validate()?;
        let avail_w = width as i64 - self.padding_x as i64 * (self.cols as i64 - 1);
        let avail_h = height as i64 - self.padding_y as i64 * (self.rows as i64 - 1);
        let cw = avail_w.div_euclid(self.cols as i64);
        let ch = avail_h.div_euclid(self.rows as i64);
        if cw <= 0 || ch <= 0 {
            return Err(CutterError::InvalidParameter(format!(
                "derived cell size {}x{} is not positive ({}x{} sheet, {} rows, {} cols)",
                cw, ch, width, height, self.rows, self.cols
            )));
        }
        Ok((cw as u32, ch as u32))
    }

    /// The equivalent size-based grid for a `width x height` sheet.
    pub fn to_grid_by_size(&self, width: u32, height: u32) -> Result<GridBySize> {
        let (cw, ch) = self.cell_size(width, height)?;
        Ok(GridBySize::new(cw, ch)
            .with_padding(self.padding_x, self.padding_y)
            .with_alpha_threshold(self.alpha_threshold))
    }
}

/// Pixel connectivity used when grouping opaque pixels into components.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

impl FromStr for Connectivity {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "4" | "four" => Ok(Self::Four),
            "8" | "eight" => Ok(Self::Eight),
            _ => Err(()),
        }
    }
}

/// Connected-component detection on the alpha mask.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoDetect {
    #[serde(default = "default_min_sprite_size")]
    pub min_sprite_size: u32,
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl Default for AutoDetect {
    fn default() -> Self {
        Self {
            min_sprite_size: default_min_sprite_size(),
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            connectivity: Connectivity::Eight,
        }
    }
}

/// A caller-supplied rectangle. Coordinates are signed because regions drawn
/// by a front-end may start outside the sheet; they are clamped on use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ManualRegion {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            name: None,
        }
    }
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Caller-supplied rectangles, used in order and without deduplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ManualRegions {
    pub regions: Vec<ManualRegion>,
}

impl ManualRegions {
    pub fn new(regions: Vec<ManualRegion>) -> Self {
        Self { regions }
    }
}

/// Extraction parameters for every supported strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractMode {
    GridBySize(GridBySize),
    GridByCount(GridByCount),
    AutoDetect(AutoDetect),
    Manual(ManualRegions),
}

/// Output image encodings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Tga,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tga => "tga",
        }
    }

    /// False for lossy encodings that drop the alpha channel on save.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Tga => image::ImageFormat::Tga,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "tga" => Ok(Self::Tga),
            _ => Err(()),
        }
    }
}

/// Export layouts understood by the serializer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Individual,
    Atlas,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Atlas => "atlas",
        }
    }
}

impl FromStr for ExportMode {
    type Err = CutterError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "individual" => Ok(Self::Individual),
            "atlas" => Ok(Self::Atlas),
            other => Err(CutterError::InvalidMode(other.to_string())),
        }
    }
}

/// One file per sprite, named `{prefix}{index:03}.{ext}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndividualExportConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub format: ImageFormat,
    /// Trim transparent borders before writing.
    #[serde(default)]
    pub trim: bool,
    #[serde(default = "default_alpha_threshold")]
    pub trim_threshold: u8,
}

impl Default for IndividualExportConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            format: ImageFormat::Png,
            trim: false,
            trim_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// A single packed image plus frame metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasExportConfig {
    #[serde(default = "default_atlas_name")]
    pub name: String,
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "default_atlas_padding")]
    pub padding: u32,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default)]
    pub trim: bool,
    #[serde(default = "default_alpha_threshold")]
    pub trim_threshold: u8,
}

impl Default for AtlasExportConfig {
    fn default() -> Self {
        Self {
            name: default_atlas_name(),
            format: ImageFormat::Png,
            padding: DEFAULT_ATLAS_PADDING,
            max_width: DEFAULT_MAX_WIDTH,
            trim: false,
            trim_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl AtlasExportConfig {
    /// Create a fluent builder for `AtlasExportConfig`.
    pub fn builder() -> AtlasExportConfigBuilder {
        AtlasExportConfigBuilder::new()
    }

    /// Atlas image file name, e.g. `atlas.png`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }
}

/// Builder for `AtlasExportConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasExportConfigBuilder {
    cfg: AtlasExportConfig,
}

impl AtlasExportConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasExportConfig::default(),
        }
    }
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.cfg.name = v.into();
        self
    }
    pub fn format(mut self, v: ImageFormat) -> Self {
        self.cfg.format = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn with_max_width(mut self, v: u32) -> Self {
        self.cfg.max_width = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn build(self) -> AtlasExportConfig {
        self.cfg
    }
}

/// Export configuration, one fully-populated variant per mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "export_mode", rename_all = "lowercase")]
pub enum ExportConfig {
    Individual(IndividualExportConfig),
    Atlas(AtlasExportConfig),
}

impl ExportConfig {
    /// Default configuration for a mode string (`individual` or `atlas`).
    pub fn from_mode(mode: &str) -> Result<Self> {
        Ok(match mode.parse::<ExportMode>()? {
            ExportMode::Individual => Self::Individual(IndividualExportConfig::default()),
            ExportMode::Atlas => Self::Atlas(AtlasExportConfig::default()),
        })
    }

    pub fn mode(&self) -> ExportMode {
        match self {
            Self::Individual(_) => ExportMode::Individual,
            Self::Atlas(_) => ExportMode::Atlas,
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            Self::Individual(c) => c.format,
            Self::Atlas(c) => c.format,
        }
    }

    /// `Some(threshold)` when sprites should be trimmed before export.
    pub fn trim_threshold(&self) -> Option<u8> {
        match self {
            Self::Individual(c) => c.trim.then_some(c.trim_threshold),
            Self::Atlas(c) => c.trim.then_some(c.trim_threshold),
        }
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if a file name component is empty, the atlas width bound
    /// is zero or the atlas padding is wider than that bound.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Individual(c) => {
                if c.prefix.is_empty() {
                    return Err(CutterError::InvalidParameter(
                        "individual export prefix must not be empty".into(),
                    ));
                }
            }
            Self::Atlas(c) => {
                if c.name.is_empty() {
                    return Err(CutterError::InvalidParameter(
                        "atlas name must not be empty".into(),
                    ));
                }
                if c.max_width == 0 {
                    return Err(CutterError::InvalidParameter(
                        "atlas max_width must be positive".into(),
                    ));
                }
                if c.padding > c.max_width {
                    return Err(CutterError::InvalidParameter(format!(
                        "atlas padding {} exceeds max_width {}",
                        c.padding, c.max_width
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_alpha_threshold() -> u8 {
    DEFAULT_ALPHA_THRESHOLD
}
fn default_min_sprite_size() -> u32 {
    8
}
fn default_prefix() -> String {
    "sprite_".into()
}
fn default_atlas_name() -> String {
    "atlas".into()
}
fn default_atlas_padding() -> u32 {
    DEFAULT_ATLAS_PADDING
}
fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}
