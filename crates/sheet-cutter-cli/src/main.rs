use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use sheet_cutter_core::animation::{ActionSet, AnimationConfig, AtlasDocument, DEFAULT_FRAME_RATE};
use sheet_cutter_core::config::{
    AtlasExportConfig, AutoDetect, Connectivity, DEFAULT_ALPHA_THRESHOLD, DEFAULT_ATLAS_PADDING,
    DEFAULT_MAX_WIDTH, ExportConfig, ExportMode, ExtractMode, GridByCount, GridBySize, ImageFormat,
    IndividualExportConfig, MANUAL_MIN_SIZE, ManualRegion, ManualRegions,
};
use sheet_cutter_core::extract::retain_min_size;
use sheet_cutter_core::{CutterSession, ExportMetadata};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-cutter",
    about = "Cut sprite sheets into sprites and export them as files or an atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars in batch mode (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut a fixed-size grid (cell size, padding, offset)
    Grid(GridArgs),
    /// Cut a grid given by rows and columns
    GridCount(GridCountArgs),
    /// Detect sprites as connected regions of opaque pixels
    Auto(AutoArgs),
    /// Cut caller-supplied rectangles
    Manual(ManualArgs),
    /// Group frames of an exported atlas into actions and write animation_config.json
    Animate(AnimateArgs),
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Input sheet or directory of sheets
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    /// Export mode: individual | atlas
    #[arg(long, default_value = "individual", help_heading = "Export")]
    mode: String,
    /// Output directory (one subdirectory per sheet in batch mode)
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// File name prefix for individual export
    #[arg(long, default_value = "sprite_", help_heading = "Export")]
    prefix: String,
    /// Atlas base name (atlas mode)
    #[arg(long, default_value = "atlas", help_heading = "Export")]
    atlas_name: String,
    /// Image format: png | jpg | tga
    #[arg(long, default_value = "png", help_heading = "Export")]
    format: String,
    /// Padding between atlas frames
    #[arg(long, default_value_t = DEFAULT_ATLAS_PADDING, help_heading = "Export")]
    padding: u32,
    /// Maximum atlas width
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH, help_heading = "Export")]
    max_width: u32,
    /// Trim transparent borders before export
    #[arg(long, default_value_t = false, help_heading = "Export")]
    trim: bool,
    /// Trim alpha threshold (0..=255)
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD, help_heading = "Export")]
    trim_threshold: u8,
    /// Sprite indices to export, comma separated (default: all)
    #[arg(long, value_delimiter = ',', help_heading = "Export")]
    select: Vec<usize>,
    /// YAML config file path (present keys override export options)
    #[arg(long, help_heading = "Export")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: extract and report sprites but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct GridArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Cell width
    #[arg(long, help_heading = "Grid")]
    cell_width: u32,
    /// Cell height
    #[arg(long, help_heading = "Grid")]
    cell_height: u32,
    /// Horizontal gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    padding_x: u32,
    /// Vertical gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    padding_y: u32,
    /// Left offset of the first cell
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    offset_x: u32,
    /// Top offset of the first cell
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    offset_y: u32,
    /// Cells whose alpha never exceeds this are skipped
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD, help_heading = "Grid")]
    alpha_threshold: u8,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Parser, Debug, Clone)]
struct GridCountArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Number of rows
    #[arg(long, help_heading = "Grid")]
    rows: u32,
    /// Number of columns
    #[arg(long, help_heading = "Grid")]
    cols: u32,
    /// Horizontal gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    padding_x: u32,
    /// Vertical gap between cells
    #[arg(long, default_value_t = 0, help_heading = "Grid")]
    padding_y: u32,
    /// Cells whose alpha never exceeds this are skipped
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD, help_heading = "Grid")]
    alpha_threshold: u8,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Parser, Debug, Clone)]
struct AutoArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Components with width or height below this are discarded
    #[arg(long, default_value_t = 8, help_heading = "Detection")]
    min_size: u32,
    /// Pixels with alpha above this are foreground
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD, help_heading = "Detection")]
    alpha_threshold: u8,
    /// Pixel connectivity: 4 | 8
    #[arg(long, default_value = "8", help_heading = "Detection")]
    connectivity: String,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Parser, Debug, Clone)]
struct ManualArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Region as x,y,w,h (repeatable)
    #[arg(long = "rect", value_parser = parse_rect, allow_hyphen_values = true, help_heading = "Regions")]
    rects: Vec<ManualRegion>,
    /// Name for the region at the same position (repeatable)
    #[arg(long = "name", help_heading = "Regions")]
    names: Vec<String>,
    /// JSON or YAML file holding `regions: [{x, y, width, height, name?}]`
    #[arg(long, help_heading = "Regions")]
    regions: Option<PathBuf>,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Parser, Debug, Clone)]
struct AnimateArgs {
    /// Directory holding an atlas export (metadata.json + atlas image)
    dir: PathBuf,
    /// Action as name=i,j,k over frame indices (repeatable)
    #[arg(long = "action", value_parser = parse_action)]
    actions: Vec<ActionSpec>,
    /// Playback rate written to the config
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    fps: u32,
    /// Display scale ratio written to the config
    #[arg(long, default_value_t = 1.0)]
    scale: f32,
    /// Print the derived frame grid
    #[arg(long, default_value_t = false)]
    list: bool,
}

#[derive(Debug, Clone)]
struct ActionSpec {
    name: String,
    frames: Vec<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Grid(a) => {
            let p = GridBySize::new(a.cell_width, a.cell_height)
                .with_padding(a.padding_x, a.padding_y)
                .with_offset(a.offset_x, a.offset_y)
                .with_alpha_threshold(a.alpha_threshold);
            p.validate()?;
            run_extract(&ExtractMode::GridBySize(p), &a.input, &a.export, progress)
        }
        Commands::GridCount(a) => {
            let p = GridByCount::new(a.rows, a.cols)
                .with_padding(a.padding_x, a.padding_y)
                .with_alpha_threshold(a.alpha_threshold);
            p.validate()?;
            run_extract(&ExtractMode::GridByCount(p), &a.input, &a.export, progress)
        }
        Commands::Auto(a) => {
            let connectivity: Connectivity = a
                .connectivity
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown connectivity: {}", a.connectivity))?;
            let p = AutoDetect {
                min_sprite_size: a.min_size,
                alpha_threshold: a.alpha_threshold,
                connectivity,
            };
            run_extract(&ExtractMode::AutoDetect(p), &a.input, &a.export, progress)
        }
        Commands::Manual(a) => {
            let regions = collect_regions(a)?;
            run_extract(&ExtractMode::Manual(regions), &a.input, &a.export, progress)
        }
        Commands::Animate(a) => run_animate(a),
    }
}

#[derive(Serialize)]
struct MergedConfig<'a> {
    extract: &'a ExtractMode,
    export: &'a ExportConfig,
}

fn run_extract(
    mode: &ExtractMode,
    input: &InputArgs,
    args: &ExportArgs,
    show_progress: bool,
) -> anyhow::Result<()> {
    let args = match &args.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            y.into_export_args(args.clone())
        }
        None => args.clone(),
    };
    let cfg = build_export_config(&args)?;

    if args.print_config {
        let merged = MergedConfig {
            extract: mode,
            export: &cfg,
        };
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&merged)?),
            _ => println!("{}", serde_json::to_string_pretty(&merged)?),
        }
        return Ok(());
    }

    if !cfg.format().supports_alpha() {
        warn!(
            format = cfg.format().extension(),
            "format has no alpha channel; transparency will be lost"
        );
    }

    let paths = gather_paths(&input.input, &input.include, &input.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no input images found at {}", input.input.display());
    }
    let batch = input.input.is_dir();
    info!(count = paths.len(), batch, "found input sheets");
    let out_dirs = if batch {
        batch_out_dirs(&input.input, &paths)?
            .into_iter()
            .map(|d| args.out_dir.join(d))
            .collect()
    } else {
        vec![args.out_dir.clone(); paths.len()]
    };

    let bar = if show_progress && batch {
        use indicatif::{ProgressBar, ProgressStyle};
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} cutting {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let started = Instant::now();
    let mut failed = 0usize;
    for (path, out_dir) in paths.iter().zip(&out_dirs) {
        if let Some(b) = &bar {
            b.set_message(path.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string());
        }
        match cut_sheet(path, mode, &cfg, &args, out_dir) {
            Ok(()) => {}
            Err(e) if batch => {
                failed += 1;
                error!(?path, error = %format!("{e:#}"), "skip sheet");
            }
            Err(e) => return Err(e),
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(
        sheets = paths.len(),
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
    if failed > 0 {
        anyhow::bail!("{} of {} sheets failed", failed, paths.len());
    }
    Ok(())
}

fn cut_sheet(
    path: &Path,
    mode: &ExtractMode,
    cfg: &ExportConfig,
    args: &ExportArgs,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let mut session = CutterSession::new();
    session.set_image(load_image(path).with_context(|| format!("load {}", path.display()))?);
    let count = session
        .extract(mode)
        .with_context(|| format!("extract {}", path.display()))?
        .len();
    info!(?path, sprites = count, "extracted");

    if args.select.is_empty() {
        session.select_all();
    } else {
        session.select(args.select.iter().copied());
        let ignored: Vec<_> = args.select.iter().filter(|&&i| i >= count).collect();
        if !ignored.is_empty() {
            warn!(?ignored, sprites = count, "selection indices out of range");
        }
    }

    if args.dry_run {
        println!("{}: {} sprites", path.display(), count);
        for s in session.selected_sprites() {
            println!("  {} {},{} {}x{}", s.name, s.x(), s.y(), s.width(), s.height());
        }
        return Ok(());
    }

    let meta = session
        .export(out_dir, cfg)
        .with_context(|| format!("export to {}", out_dir.display()))?;
    match &meta {
        ExportMetadata::Individual(m) => {
            info!(out = %out_dir.display(), files = m.sprite_count, "individual export written")
        }
        ExportMetadata::Atlas(m) => info!(
            out = %out_dir.display(),
            atlas = %m.atlas_file,
            width = m.atlas_size.width,
            height = m.atlas_size.height,
            sprites = m.sprite_count,
            "atlas written"
        ),
    }
    Ok(())
}

fn build_export_config(a: &ExportArgs) -> anyhow::Result<ExportConfig> {
    let format: ImageFormat = a
        .format
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown image format: {}", a.format))?;
    let cfg = match a.mode.parse::<ExportMode>()? {
        ExportMode::Individual => ExportConfig::Individual(IndividualExportConfig {
            prefix: a.prefix.clone(),
            format,
            trim: a.trim,
            trim_threshold: a.trim_threshold,
        }),
        ExportMode::Atlas => ExportConfig::Atlas(
            AtlasExportConfig::builder()
                .name(a.atlas_name.as_str())
                .format(format)
                .padding(a.padding)
                .with_max_width(a.max_width)
                .trim(a.trim)
                .trim_threshold(a.trim_threshold)
                .build(),
        ),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn collect_regions(a: &ManualArgs) -> anyhow::Result<ManualRegions> {
    let mut regions: Vec<ManualRegion> = match &a.regions {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read regions {}", path.display()))?;
            let parsed: ManualRegions = if has_extension(path, "json") {
                serde_json::from_str(&file)?
            } else {
                serde_yaml::from_str(&file)?
            };
            parsed.regions
        }
        None => Vec::new(),
    };
    let base = regions.len();
    for (i, r) in a.rects.iter().enumerate() {
        let mut r = r.clone();
        if let Some(name) = a.names.get(i) {
            r.name = Some(name.clone());
        }
        regions.push(r);
    }
    debug!(from_file = base, from_args = a.rects.len(), "collected regions");

    let total = regions.len();
    let regions = retain_min_size(regions, MANUAL_MIN_SIZE);
    if regions.len() < total {
        warn!(
            dropped = total - regions.len(),
            min = MANUAL_MIN_SIZE,
            "regions not larger than the minimum size were dropped"
        );
    }
    if regions.is_empty() {
        anyhow::bail!("no usable regions; pass --rect x,y,w,h or --regions <file>");
    }
    Ok(ManualRegions::new(regions))
}

fn run_animate(a: &AnimateArgs) -> anyhow::Result<()> {
    let doc = AtlasDocument::load(&a.dir).with_context(|| format!("load atlas {}", a.dir.display()))?;

    if a.list {
        println!("{:>5} {:>4} {:>4}  frame", "index", "row", "col");
        for f in &doc.frames {
            println!(
                "{:>5} {:>4} {:>4}  {},{} {}x{}",
                f.index, f.row, f.col, f.rect.x, f.rect.y, f.rect.w, f.rect.h
            );
        }
        if a.actions.is_empty() {
            return Ok(());
        }
    }

    let mut actions = ActionSet::new();
    for action in &a.actions {
        actions
            .add(&action.name, &action.frames, &doc.frames)
            .with_context(|| format!("action '{}'", action.name))?;
    }
    let config = AnimationConfig::build(&doc.metadata, &doc.frames, &actions, a.fps, a.scale)?;
    let path = config.write(&doc.dir)?;
    info!(path = %path.display(), actions = actions.len(), fps = a.fps, "animation config written");
    Ok(())
}

fn parse_rect(s: &str) -> Result<ManualRegion, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid rect '{s}': {e}"))?;
    match parts[..] {
        [x, y, w, h] => Ok(ManualRegion::new(x, y, w, h)),
        _ => Err(format!("expected x,y,w,h, got '{s}'")),
    }
}

fn parse_action(s: &str) -> Result<ActionSpec, String> {
    let (name, frames) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=i,j,k, got '{s}'"))?;
    let frames = frames
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid frame list in '{s}': {e}"))?;
    Ok(ActionSpec {
        name: name.trim().to_string(),
        frames,
    })
}

fn sheet_stem(p: &Path) -> String {
    p.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".into())
}

/// Output subdirectory of each sheet, mirroring its path below `root` without
/// the extension (`a/hero.png` -> `a/hero`). Sheets that would still share a
/// directory, like `hero.png` next to `hero.jpg`, keep the extension in the
/// name (`hero_png`, `hero_jpg`).
fn batch_out_dirs(root: &Path, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let plain: Vec<PathBuf> = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).with_extension(""))
        .collect();
    let mut counts: HashMap<&Path, usize> = HashMap::new();
    for d in &plain {
        *counts.entry(d.as_path()).or_default() += 1;
    }
    let dirs: Vec<PathBuf> = paths
        .iter()
        .zip(&plain)
        .map(|(p, d)| {
            if counts.get(d.as_path()).copied().unwrap_or(0) > 1 {
                let ext = p
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default();
                d.with_file_name(format!("{}_{}", sheet_stem(p), ext))
            } else {
                d.clone()
            }
        })
        .collect();

    let mut seen = HashSet::new();
    for (p, d) in paths.iter().zip(&dirs) {
        if !seen.insert(d.as_path()) {
            anyhow::bail!(
                "sheets would share output directory {} (at {})",
                d.display(),
                p.display()
            );
        }
    }
    Ok(dirs)
}

fn has_extension(p: &Path, ext: &str) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("glob '{pat}'"))?);
    }
    Ok(Some(b.build()?))
}

fn gather_paths(path: &Path, include: &[String], exclude: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
            list.push(p.to_path_buf());
        }
    }
    Ok(list)
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if exclude.is_some_and(|ex| ex.is_match(&s)) {
        return true;
    }
    include.is_some_and(|inc| !inc.is_match(&s))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// Export options read from `--config`; present keys override the command line.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct YamlConfig {
    mode: Option<String>,
    prefix: Option<String>,
    atlas_name: Option<String>,
    format: Option<String>,
    padding: Option<u32>,
    max_width: Option<u32>,
    trim: Option<bool>,
    trim_threshold: Option<u8>,
    select: Option<Vec<usize>>,
    out_dir: Option<PathBuf>,
}

impl YamlConfig {
    fn into_export_args(self, mut a: ExportArgs) -> ExportArgs {
        if let Some(v) = self.mode {
            a.mode = v;
        }
        if let Some(v) = self.prefix {
            a.prefix = v;
        }
        if let Some(v) = self.atlas_name {
            a.atlas_name = v;
        }
        if let Some(v) = self.format {
            a.format = v;
        }
        if let Some(v) = self.padding {
            a.padding = v;
        }
        if let Some(v) = self.max_width {
            a.max_width = v;
        }
        if let Some(v) = self.trim {
            a.trim = v;
        }
        if let Some(v) = self.trim_threshold {
            a.trim_threshold = v;
        }
        if let Some(v) = self.select {
            a.select = v;
        }
        if let Some(v) = self.out_dir {
            a.out_dir = v;
        }
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn batch_dirs_mirror_the_input_tree() {
        let root = Path::new("sheets");
        let dirs = batch_out_dirs(root, &paths(&["sheets/a/hero.png", "sheets/b/hero.png", "sheets/slime.png"]))
            .expect("dirs");
        assert_eq!(dirs, paths(&["a/hero", "b/hero", "slime"]));
    }

    #[test]
    fn batch_dirs_keep_extension_for_same_stem() {
        let root = Path::new("sheets");
        let dirs = batch_out_dirs(root, &paths(&["sheets/hero.jpg", "sheets/hero.png", "sheets/orc.png"]))
            .expect("dirs");
        assert_eq!(dirs, paths(&["hero_jpg", "hero_png", "orc"]));
    }

    #[test]
    fn batch_dirs_reject_remaining_collisions() {
        let root = Path::new("sheets");
        let err = batch_out_dirs(
            root,
            &paths(&["sheets/hero.png", "sheets/hero.jpg", "sheets/hero_png.gif"]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn rect_accepts_negative_origin() {
        let cli = Cli::try_parse_from([
            "sheet-cutter",
            "manual",
            "sheet.png",
            "--rect",
            "-5,0,20,20",
            "--rect",
            "1,-2,3,4",
        ])
        .expect("parse");
        let Commands::Manual(a) = cli.command else {
            panic!("expected manual command");
        };
        assert_eq!(a.rects, vec![ManualRegion::new(-5, 0, 20, 20), ManualRegion::new(1, -2, 3, 4)]);
    }

    #[test]
    fn rect_rejects_malformed_values() {
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
        assert_eq!(parse_rect(" 1, 2, 3, 4").expect("rect"), ManualRegion::new(1, 2, 3, 4));
    }

    #[test]
    fn count_grid_threshold_reaches_the_config() {
        let cli = Cli::try_parse_from([
            "sheet-cutter",
            "grid-count",
            "sheet.png",
            "--rows",
            "2",
            "--cols",
            "3",
            "--alpha-threshold",
            "40",
        ])
        .expect("parse");
        let Commands::GridCount(a) = cli.command else {
            panic!("expected grid-count command");
        };
        assert_eq!(a.alpha_threshold, 40);
    }
}
