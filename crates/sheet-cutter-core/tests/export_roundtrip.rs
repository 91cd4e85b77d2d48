use image::{Rgba, RgbaImage};
use sheet_cutter_core::compositing::crop_frame;
use sheet_cutter_core::config::{
    AtlasExportConfig, ExportConfig, ExportMode, GridBySize, ImageFormat, IndividualExportConfig,
    METADATA_FILE,
};
use sheet_cutter_core::error::CutterError;
use sheet_cutter_core::export::{ExportMetadata, build_atlas, export, to_json};
use sheet_cutter_core::extract::grid::grid_cut_by_size;
use sheet_cutter_core::model::{Rect, SourceImage, Sprite};
use serde_json::Value;

/// 4x2 grid of 16x16 cells, each a distinct colour with a transparent corner.
fn sprites() -> Vec<Sprite> {
    let mut img = RgbaImage::from_pixel(64, 32, Rgba([0, 0, 0, 0]));
    for (x, y, px) in img.enumerate_pixels_mut() {
        let cell = (y / 16) * 4 + x / 16;
        if x % 16 < 12 && y % 16 < 10 + cell % 3 {
            *px = Rgba([(cell * 30) as u8, (x * 3) as u8, (y * 5) as u8, 255]);
        }
    }
    let src = SourceImage::from_rgba(img);
    grid_cut_by_size(&src, &GridBySize::new(16, 16)).expect("cut")
}

#[test]
fn atlas_frames_round_trip_pixel_exact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sprites = sprites();
    let cfg = ExportConfig::Atlas(
        AtlasExportConfig::builder()
            .name("heroes")
            .padding(3)
            .with_max_width(40)
            .build(),
    );
    let meta = export(&sprites, dir.path(), &cfg).expect("export");
    let ExportMetadata::Atlas(atlas_meta) = &meta else {
        panic!("expected atlas metadata");
    };
    assert_eq!(atlas_meta.atlas_file, "heroes.png");
    assert_eq!(atlas_meta.sprite_count, sprites.len());
    assert_eq!(atlas_meta.sprite_padding, 3);

    let read = ExportMetadata::read(dir.path().join(METADATA_FILE)).expect("read metadata");
    assert_eq!(read, meta);

    let atlas = image::open(dir.path().join("heroes.png")).expect("atlas").to_rgba8();
    assert_eq!(atlas.dimensions(), (atlas_meta.atlas_size.width, atlas_meta.atlas_size.height));
    for (entry, sprite) in atlas_meta.sprites.iter().zip(&sprites) {
        assert_eq!(entry.name, sprite.name);
        let frame: Rect = entry.frame.into();
        assert!(frame.x + frame.w <= 40);
        let cropped = crop_frame(&atlas, &frame).expect("frame inside atlas");
        assert_eq!(cropped, sprite.pixels);
    }
}

#[test]
fn atlas_metadata_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::from_mode("atlas").expect("mode");
    assert_eq!(cfg.mode(), ExportMode::Atlas);
    let meta = export(&sprites(), dir.path(), &cfg).expect("export");
    assert_eq!(to_json(&meta).expect("json")["atlas_file"], "atlas.png");
    let text = std::fs::read_to_string(dir.path().join(METADATA_FILE)).expect("read");
    let v: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(v["export_mode"], "atlas");
    assert_eq!(v["atlas_name"], "atlas");
    assert_eq!(v["atlas_file"], "atlas.png");
    assert_eq!(v["sprite_padding"], 2);
    assert_eq!(v["sprite_count"], 8);
    assert!(v["atlas_size"]["width"].as_u64().unwrap() <= 2048);
    let first = &v["sprites"][0];
    assert_eq!(first["name"], "sprite_000");
    for key in ["x", "y", "width", "height"] {
        assert!(first["frame"][key].is_u64(), "frame.{key}");
    }
}

#[test]
fn individual_export_names_files_by_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let all = sprites();
    let picked = vec![all[1].clone(), all[3].clone()];
    let cfg = ExportConfig::Individual(IndividualExportConfig {
        prefix: "frame_".into(),
        ..Default::default()
    });
    let meta = export(&picked, dir.path().join("nested/out"), &cfg).expect("export");
    let ExportMetadata::Individual(m) = meta else {
        panic!("expected individual metadata");
    };
    assert_eq!(m.sprite_count, 2);
    assert_eq!(m.sprites[0].index, 0);
    assert_eq!(m.sprites[0].name, "sprite_001");
    assert_eq!(m.sprites[0].file, "frame_000.png");
    assert_eq!(m.sprites[1].name, "sprite_003");
    assert_eq!(m.sprites[1].file, "frame_001.png");
    assert_eq!((m.sprites[1].width, m.sprites[1].height), (16, 16));

    let out = dir.path().join("nested/out");
    let back = image::open(out.join("frame_001.png")).expect("png").to_rgba8();
    assert_eq!(back, picked[1].pixels);

    let v: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(METADATA_FILE)).expect("read")).expect("json");
    assert_eq!(v["export_mode"], "individual");
    assert_eq!(v["sprites"][1]["file"], "frame_001.png");
}

#[test]
fn export_trims_when_asked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::Individual(IndividualExportConfig {
        trim: true,
        ..Default::default()
    });
    let ExportMetadata::Individual(m) = export(&sprites(), dir.path(), &cfg).expect("export") else {
        panic!("expected individual metadata");
    };
    assert_eq!((m.sprites[0].width, m.sprites[0].height), (12, 10));
    assert_eq!((m.sprites[1].width, m.sprites[1].height), (12, 11));
}

#[test]
fn repeated_export_overwrites() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::from_mode("individual").expect("mode");
    let s = sprites();
    export(&s, dir.path(), &cfg).expect("first");
    let meta = export(&s[..2], dir.path(), &cfg).expect("second");
    assert_eq!(meta.sprite_count(), 2);
    let read = ExportMetadata::read(dir.path().join(METADATA_FILE)).expect("read");
    assert_eq!(read.sprite_count(), 2);
}

#[test]
fn lossy_format_drops_alpha() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::Individual(IndividualExportConfig {
        format: ImageFormat::Jpeg,
        ..Default::default()
    });
    assert!(!cfg.format().supports_alpha());
    export(&sprites()[..1], dir.path(), &cfg).expect("export");
    let img = image::open(dir.path().join("sprite_000.jpg")).expect("jpg");
    assert!(!img.color().has_alpha());
}

#[test]
fn mode_and_empty_input_errors() {
    assert!(matches!(ExportConfig::from_mode("zip"), Err(CutterError::InvalidMode(m)) if m == "zip"));
    assert!(matches!("Atlas".parse::<ExportMode>(), Err(CutterError::InvalidMode(_))));
    assert!(matches!(
        ExportMetadata::from_json_str(r#"{"export_mode":"sheet","sprites":[]}"#),
        Err(CutterError::InvalidMode(_))
    ));

    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::from_mode("atlas").expect("mode");
    assert!(matches!(export(&[], dir.path(), &cfg), Err(CutterError::NoSprites)));

    let ghost = Sprite::new("ghost", Rect::new(0, 0, 4, 4), RgbaImage::new(4, 4));
    let trim_cfg = ExportConfig::Atlas(AtlasExportConfig::builder().trim(true).build());
    assert!(matches!(export(&[ghost], dir.path(), &trim_cfg), Err(CutterError::NoSprites)));

    let bad = ExportConfig::Atlas(AtlasExportConfig::builder().name("").build());
    assert!(matches!(export(&sprites(), dir.path(), &bad), Err(CutterError::InvalidParameter(_))));

    let wide_gap = ExportConfig::Atlas(
        AtlasExportConfig::builder()
            .padding(u32::MAX)
            .with_max_width(2048)
            .build(),
    );
    assert!(matches!(
        export(&sprites(), dir.path(), &wide_gap),
        Err(CutterError::InvalidParameter(_))
    ));
}

#[test]
fn unwritable_output_is_an_io_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"x").expect("write");
    let cfg = ExportConfig::from_mode("individual").expect("mode");
    let err = export(&sprites(), blocker.join("out"), &cfg).unwrap_err();
    assert!(err.is_io_failure());
}

#[test]
fn in_memory_atlas_matches_layout() {
    let s = sprites();
    let out = build_atlas(&s, &AtlasExportConfig::default()).expect("atlas");
    assert_eq!(out.rgba.dimensions(), (out.layout.width, out.layout.height));
    assert_eq!(out.metadata.sprites.len(), out.layout.placements.len());
    let occ = out.layout.occupancy();
    assert!(occ > 0.0 && occ <= 1.0);
    // canvas starts transparent where nothing is drawn
    let last = out.layout.placements.iter().map(|p| p.frame).max_by_key(|f| (f.y, f.x)).unwrap();
    if last.x + last.w < out.rgba.width() {
        assert_eq!(out.rgba.get_pixel(out.rgba.width() - 1, last.y)[3], 0);
    }
}
