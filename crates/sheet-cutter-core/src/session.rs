use crate::config::{AutoDetect, ExportConfig, ExtractMode, GridByCount, GridBySize, ManualRegion, ManualRegions};
use crate::error::{CutterError, Result};
use crate::export::{ExportMetadata, export};
use crate::extract::Extractor;
use crate::model::{SourceImage, Sprite};
use crate::trim::trim;
use image::{DynamicImage, RgbaImage};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// One cutting session: the loaded sheet, the current extraction result and
/// the set of selected sprite indices.
///
/// Sprites are never edited in place. Loading a sheet or running an
/// extraction replaces the result wholesale and clears the selection. Share a
/// session across threads only behind a single lock.
#[derive(Debug, Default)]
pub struct CutterSession {
    source: Option<SourceImage>,
    sprites: Vec<Sprite>,
    selected: BTreeSet<usize>,
}

impl CutterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a sheet from disk. On failure the previous state is kept.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<&SourceImage> {
        let source = SourceImage::open(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            width = source.width(),
            height = source.height(),
            "loaded sheet"
        );
        Ok(self.set_source(source))
    }

    pub fn set_image(&mut self, img: DynamicImage) -> &SourceImage {
        self.set_source(SourceImage::from_dynamic(img))
    }

    fn set_source(&mut self, source: SourceImage) -> &SourceImage {
        self.sprites.clear();
        self.selected.clear();
        self.source.insert(source)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Pixels of one sprite of the current result.
    pub fn preview(&self, index: usize) -> Option<&RgbaImage> {
        self.sprites.get(index).map(|s| &s.pixels)
    }

    /// Runs any extractor against the loaded sheet and makes its output current.
    pub fn extract_with<E: Extractor + ?Sized>(&mut self, extractor: &E) -> Result<&[Sprite]> {
        let source = self.source.as_ref().ok_or(CutterError::NoImageLoaded)?;
        let sprites = extractor.extract(source)?;
        self.sprites = sprites;
        self.selected.clear();
        Ok(&self.sprites)
    }

    pub fn extract(&mut self, mode: &ExtractMode) -> Result<&[Sprite]> {
        self.extract_with(mode)
    }

    pub fn grid_cut_by_size(&mut self, p: &GridBySize) -> Result<&[Sprite]> {
        self.extract_with(p)
    }

    pub fn grid_cut_by_count(&mut self, p: &GridByCount) -> Result<&[Sprite]> {
        self.extract_with(p)
    }

    pub fn auto_cut(&mut self, p: &AutoDetect) -> Result<&[Sprite]> {
        self.extract_with(p)
    }

    pub fn manual_cut(&mut self, regions: Vec<ManualRegion>) -> Result<&[Sprite]> {
        self.extract_with(&ManualRegions::new(regions))
    }

    /// Trimmed copy of the current result; the session itself is unchanged.
    pub fn trimmed(&self, threshold: u8) -> Vec<Sprite> {
        trim(&self.sprites, threshold)
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = usize>) {
        let len = self.sprites.len();
        self.selected.extend(ids.into_iter().filter(|&i| i < len));
    }

    pub fn deselect(&mut self, ids: impl IntoIterator<Item = usize>) {
        for id in ids {
            self.selected.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: usize) {
        if id >= self.sprites.len() {
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Selects everything unless everything is already selected, in which case clears.
    pub fn toggle_all(&mut self) {
        if !self.sprites.is_empty() && self.selected.len() == self.sprites.len() {
            self.selected.clear();
        } else {
            self.select_all();
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.sprites.len()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: usize) -> bool {
        self.selected.contains(&id)
    }

    pub fn selection(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Selected sprites in result order.
    pub fn selected_sprites(&self) -> Vec<Sprite> {
        self.selected
            .iter()
            .filter_map(|&i| self.sprites.get(i).cloned())
            .collect()
    }

    /// Exports the selected sprites.
    ///
    /// Fails with `NoSprites` when there is no extraction result and with
    /// `NoSelection` when nothing is selected.
    pub fn export(&self, out_dir: impl AsRef<Path>, cfg: &ExportConfig) -> Result<ExportMetadata> {
        if self.sprites.is_empty() {
            return Err(CutterError::NoSprites);
        }
        if self.selected.is_empty() {
            return Err(CutterError::NoSelection);
        }
        export(&self.selected_sprites(), out_dir, cfg)
    }
}
