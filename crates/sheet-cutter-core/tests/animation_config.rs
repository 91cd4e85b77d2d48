use image::{Rgba, RgbaImage};
use serde_json::Value;
use sheet_cutter_core::animation::{
    ANIMATION_CONFIG_FILE, ActionSet, AnimationConfig, AtlasDocument, DEFAULT_FRAME_RATE,
    derive_frames,
};
use sheet_cutter_core::prelude::*;

fn frames_sprites(n: u32) -> Vec<Sprite> {
    (0..n)
        .map(|i| {
            let px = RgbaImage::from_pixel(16, 16, Rgba([(i * 40) as u8, 0, 200, 255]));
            Sprite::new(format!("sprite_{i:03}"), Rect::new(i * 16, 0, 16, 16), px)
        })
        .collect()
}

fn export_atlas(dir: &std::path::Path) -> AtlasMetadata {
    let cfg = ExportConfig::Atlas(
        AtlasExportConfig::builder()
            .name("walker")
            .padding(2)
            .with_max_width(40)
            .build(),
    );
    match export(&frames_sprites(4), dir, &cfg).expect("export") {
        ExportMetadata::Atlas(m) => m,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn frames_map_to_grid_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let meta = export_atlas(dir.path());
    let cells = derive_frames(&meta);
    let rc: Vec<_> = cells.iter().map(|c| (c.row, c.col)).collect();
    assert_eq!(rc, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    assert_eq!(cells[3].rect, Rect::new(18, 18, 16, 16));
}

#[test]
fn document_loads_atlas_and_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    export_atlas(dir.path());
    let doc = AtlasDocument::load(dir.path()).expect("load");
    assert_eq!(doc.metadata.atlas_name, "walker");
    assert_eq!(doc.frames.len(), 4);
    let sprites = frames_sprites(4);
    for (i, s) in sprites.iter().enumerate() {
        assert_eq!(doc.frame_image(i).as_ref(), Some(&s.pixels));
    }
    assert!(doc.frame_image(4).is_none());
}

#[test]
fn individual_metadata_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = ExportConfig::from_mode("individual").expect("mode");
    export(&frames_sprites(2), dir.path(), &cfg).expect("export");
    let err = AtlasDocument::load(dir.path()).unwrap_err();
    assert!(matches!(err, CutterError::InvalidMode(m) if m == "individual"));
}

#[test]
fn missing_metadata_is_io_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(AtlasDocument::load(dir.path()).unwrap_err().is_io_failure());
}

#[test]
fn action_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cells = derive_frames(&export_atlas(dir.path()));
    let mut actions = ActionSet::new();

    let walk = actions.add("walk", &[3, 1], &cells).expect("walk");
    assert_eq!(walk.frames, vec![(0, 1), (1, 1)]);

    let invalid = |r: Result<_>| matches!(r, Err(CutterError::InvalidParameter(_)));
    assert!(invalid(actions.add("walk", &[0], &cells).map(|_| ())));
    assert!(invalid(actions.add("  ", &[0], &cells).map(|_| ())));
    assert!(invalid(actions.add("idle", &[], &cells).map(|_| ())));
    assert!(invalid(actions.add("idle", &[0, 9], &cells).map(|_| ())));
    assert_eq!(actions.len(), 1);

    let resolved = actions.cells_for("walk", &cells);
    assert_eq!(resolved.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 3]);
    assert!(actions.cells_for("run", &cells).is_empty());

    assert!(actions.remove("walk"));
    assert!(!actions.remove("walk"));
    assert!(actions.is_empty());
}

#[test]
fn config_json_keeps_action_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let meta = export_atlas(dir.path());
    let cells = derive_frames(&meta);
    let mut actions = ActionSet::new();
    actions.add("walk", &[0, 1], &cells).expect("walk");
    actions.add("idle", &[2], &cells).expect("idle");

    let cfg = AnimationConfig::build(&meta, &cells, &actions, DEFAULT_FRAME_RATE, 1.0).expect("build");
    let path = cfg.write(dir.path()).expect("write");
    assert_eq!(path, dir.path().join(ANIMATION_CONFIG_FILE));

    let text = std::fs::read_to_string(&path).expect("read");
    let walk_at = text.find("\"walk\"").expect("walk key");
    let idle_at = text.find("\"idle\"").expect("idle key");
    assert!(walk_at < idle_at);

    let v: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(v["sprite_info"]["name"], "walker");
    assert_eq!(v["sprite_info"]["width"], 16);
    assert_eq!(v["sprite_info"]["scale_ratio"], 1.0);
    assert_eq!(v["layout"]["columns"], 2);
    assert_eq!(v["layout"]["rows"], 2);
    assert_eq!(v["layout"]["padding"], 2);
    assert_eq!(v["frame_rate"], 12);
    assert_eq!(v["actions"]["walk"]["frame_count"], 2);
    assert_eq!(v["actions"]["walk"]["frames"][1], serde_json::json!([0, 1]));
    assert_eq!(v["actions"]["idle"]["frames"][0], serde_json::json!([1, 0]));
}

#[test]
fn config_needs_actions_and_rate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let meta = export_atlas(dir.path());
    let cells = derive_frames(&meta);
    let empty = ActionSet::new();
    assert!(AnimationConfig::build(&meta, &cells, &empty, 12, 1.0).is_err());

    let mut actions = ActionSet::new();
    actions.add("idle", &[0], &cells).expect("idle");
    assert!(AnimationConfig::build(&meta, &cells, &actions, 0, 1.0).is_err());
}
