use image::{Rgba, RgbaImage};
use sheet_cutter_core::alpha::is_empty;
use sheet_cutter_core::config::{GridByCount, GridBySize};
use sheet_cutter_core::error::CutterError;
use sheet_cutter_core::extract::Extractor;
use sheet_cutter_core::extract::grid::{grid_cut_by_count, grid_cut_by_size};
use sheet_cutter_core::model::{Rect, SourceImage};

fn opaque(w: u32, h: u32) -> SourceImage {
    SourceImage::from_rgba(RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255])))
}

/// Transparent sheet with a checkerboard of opaque 1px dots so that some cells are empty.
fn dotted(w: u32, h: u32) -> SourceImage {
    let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    for y in (0..h).step_by(7) {
        for x in (0..w).step_by(11) {
            if (x / 11 + y / 7) % 3 != 0 {
                img.put_pixel(x, y, Rgba([(x % 255) as u8, (y % 255) as u8, 0, 255]));
            }
        }
    }
    SourceImage::from_rgba(img)
}

#[test]
fn two_full_cells_and_partial_column_dropped() {
    let src = opaque(100, 50);
    let sprites = grid_cut_by_size(&src, &GridBySize::new(50, 50)).expect("cut");
    assert_eq!(sprites.len(), 2);
    assert_eq!(sprites[0].rect, Rect::new(0, 0, 50, 50));
    assert_eq!(sprites[1].rect, Rect::new(50, 0, 50, 50));
    assert_eq!(sprites[0].name, "sprite_000");
    assert_eq!(sprites[1].name, "sprite_001");

    let src = opaque(120, 50);
    let sprites = grid_cut_by_size(&src, &GridBySize::new(50, 50)).expect("cut");
    assert_eq!(sprites.len(), 2, "partial third column is discarded");
}

#[test]
fn transparent_cells_are_skipped_and_not_counted() {
    let mut img = RgbaImage::from_pixel(30, 10, Rgba([0, 0, 0, 0]));
    for y in 0..10 {
        for x in 20..30 {
            img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
        }
    }
    let src = SourceImage::from_rgba(img);
    let sprites = grid_cut_by_size(&src, &GridBySize::new(10, 10)).expect("cut");
    assert_eq!(sprites.len(), 1);
    assert_eq!(sprites[0].rect, Rect::new(20, 0, 10, 10));
    assert_eq!(sprites[0].name, "sprite_000");
}

#[test]
fn cells_are_grid_aligned_and_non_empty() {
    let src = dotted(97, 61);
    let p = GridBySize::new(10, 12).with_padding(3, 2).with_offset(4, 5);
    let sprites = grid_cut_by_size(&src, &p).expect("cut");
    assert!(!sprites.is_empty());
    for s in &sprites {
        assert_eq!((s.x() - p.offset_x) % (p.cell_width + p.padding_x), 0);
        assert_eq!((s.y() - p.offset_y) % (p.cell_height + p.padding_y), 0);
        assert!(src.bounds().contains(&s.rect));
        assert_eq!(s.pixels.dimensions(), (10, 12));
        assert!(!is_empty(&s.pixels, p.alpha_threshold));
    }
}

#[test]
fn scan_order_is_row_major() {
    let src = opaque(30, 20);
    let sprites = grid_cut_by_size(&src, &GridBySize::new(10, 10)).expect("cut");
    let origins: Vec<(u32, u32)> = sprites.iter().map(|s| (s.x(), s.y())).collect();
    assert_eq!(
        origins,
        vec![(0, 0), (10, 0), (20, 0), (0, 10), (10, 10), (20, 10)]
    );
    let names: Vec<&str> = sprites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names[5], "sprite_005");
}

#[test]
fn count_grid_matches_size_grid_with_derived_cells() {
    let src = dotted(100, 60);
    let by_count = GridByCount::new(3, 4).with_padding(2, 2);
    assert_eq!(by_count.cell_size(100, 60).expect("cells"), (23, 18));

    let a = grid_cut_by_count(&src, &by_count).expect("count");
    let b = grid_cut_by_size(&src, &GridBySize::new(23, 18).with_padding(2, 2)).expect("size");
    assert_eq!(a, b);
    // repeatable
    assert_eq!(a, by_count.extract(&src).expect("again"));
}

#[test]
fn invalid_grid_parameters() {
    let src = opaque(100, 100);
    assert!(matches!(
        grid_cut_by_size(&src, &GridBySize::new(0, 10)),
        Err(CutterError::InvalidParameter(_))
    ));
    assert!(matches!(
        grid_cut_by_size(&src, &GridBySize::new(10, 0)),
        Err(CutterError::InvalidParameter(_))
    ));
    assert!(matches!(
        grid_cut_by_count(&src, &GridByCount::new(0, 2)),
        Err(CutterError::InvalidParameter(_))
    ));
    // derived cell width floors to zero
    assert!(matches!(
        grid_cut_by_count(&src, &GridByCount::new(1, 200)),
        Err(CutterError::InvalidParameter(_))
    ));
    // padding eats the whole sheet
    assert!(matches!(
        grid_cut_by_count(&src, &GridByCount::new(1, 3).with_padding(60, 0)),
        Err(CutterError::InvalidParameter(_))
    ));
}

#[test]
fn cell_larger_than_sheet_yields_nothing() {
    let src = opaque(16, 16);
    let sprites = grid_cut_by_size(&src, &GridBySize::new(32, 32)).expect("cut");
    assert!(sprites.is_empty());
}

#[test]
fn count_grid_honours_alpha_threshold() {
    // left half faint, right half opaque
    let img = RgbaImage::from_fn(20, 10, |x, _| {
        if x < 10 { Rgba([9, 9, 9, 50]) } else { Rgba([9, 9, 9, 255]) }
    });
    let src = SourceImage::from_rgba(img);
    let loose = grid_cut_by_count(&src, &GridByCount::new(1, 2)).expect("cut");
    assert_eq!(loose.len(), 2);

    let strict = GridByCount::new(1, 2).with_alpha_threshold(60);
    let sprites = grid_cut_by_count(&src, &strict).expect("cut");
    assert_eq!(sprites.len(), 1);
    assert_eq!(sprites[0].rect, Rect::new(10, 0, 10, 10));
    assert_eq!(strict.to_grid_by_size(20, 10).expect("cells").alpha_threshold, 60);
}
