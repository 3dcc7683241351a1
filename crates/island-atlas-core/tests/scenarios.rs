use image::{Rgba, RgbaImage};
use island_atlas_core::error::AtlasError;
use island_atlas_core::prelude::*;

fn opaque_block(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for yy in y..y + h {
        for xx in x..x + w {
            img.put_pixel(xx, yy, Rgba([color[0], color[1], color[2], 255]));
        }
    }
}

fn solid(name: &str, w: u32, h: u32) -> SourceAsset {
    let img = RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]));
    SourceAsset::from_rgba(name, format!("{name}.png"), img)
}

#[test]
fn crop_many_splits_two_squares() {
    let mut img = RgbaImage::new(6, 2);
    opaque_block(&mut img, 0, 0, 2, 2, [255, 0, 0]);
    opaque_block(&mut img, 4, 0, 2, 2, [0, 255, 0]);
    let source = SourceAsset::from_rgba("pair", "pair.png", img);

    let cfg = AtlasConfig::builder()
        .island_mode(IslandMode::CropMany)
        .opacity_threshold(128)
        .min_island_area(1)
        .build();
    let subs = cut_source(&source, &cfg);
    let regions: Vec<Rect> = subs.iter().map(|s| s.region()).collect();
    assert_eq!(regions, vec![Rect::new(0, 0, 2, 2), Rect::new(4, 0, 2, 2)]);
    assert!(subs.iter().all(|s| s.name() == "pair"));
}

#[test]
fn snap_packer_grows_then_drops_below() {
    let mut packer = SnapPacker::new();
    let a = packer.place(4, 4);
    assert_eq!(a.rect, Rect::new(0, 0, 4, 4));
    let b = packer.place(4, 4);
    assert_eq!(b.rect, Rect::new(4, 0, 4, 4));
    assert_eq!(packer.canvas(), Rect::new(0, 0, 8, 4));
    let c = packer.place(8, 8);
    assert_eq!(c.rect, Rect::new(0, 4, 8, 8));
    assert_eq!(packer.canvas(), Rect::new(0, 0, 8, 12));
    assert!(!a.fallback && !b.fallback && !c.fallback);
}

#[test]
fn compiled_layout_matches_packer() {
    let sources = vec![solid("a", 4, 4), solid("b", 4, 4), solid("c", 8, 8)];
    let out = compile_atlases(&sources, &AtlasConfig::default()).expect("compile");
    assert_eq!(out.atlases.len(), 1);
    let atlas = &out.atlases[0];
    assert_eq!(atlas.name(), "atlas.png");
    assert_eq!(atlas.canvas().dimensions(), (8, 12));
    let targets: Vec<Rect> = atlas.records().iter().map(|r| r.target_region).collect();
    assert_eq!(
        targets,
        vec![
            Rect::new(0, 0, 4, 4),
            Rect::new(4, 0, 4, 4),
            Rect::new(0, 4, 8, 8)
        ]
    );
    assert_eq!(*atlas.canvas().get_pixel(7, 11), Rgba([200, 100, 50, 255]));
}

#[test]
fn crop_full_masks_gap_between_islands() {
    let mut img = RgbaImage::from_pixel(20, 20, Rgba([9, 9, 9, 0]));
    opaque_block(&mut img, 1, 1, 2, 2, [255, 255, 255]);
    opaque_block(&mut img, 15, 15, 3, 3, [255, 255, 255]);
    // Faint pixel inside the union: below threshold, so it must be masked out.
    img.put_pixel(8, 8, Rgba([1, 2, 3, 10]));
    let source = SourceAsset::from_rgba("far", "far.png", img);

    let cfg = AtlasConfig::builder()
        .island_mode(IslandMode::CropFull)
        .opacity_threshold(128)
        .build();
    let subs = cut_source(&source, &cfg);
    assert_eq!(subs.len(), 1);
    let sub = &subs[0];
    assert_eq!(sub.region(), Rect::new(1, 1, 17, 17));

    let mask = sub.mask().expect("crop_full carries a mask");
    for y in 0..17 {
        for x in 0..17 {
            let (sx, sy) = (x + 1, y + 1);
            let member = ((1..3).contains(&sx) && (1..3).contains(&sy))
                || ((15..18).contains(&sx) && (15..18).contains(&sy));
            assert_eq!(mask.get(x, y), member, "mask at local ({x},{y})");
        }
    }

    let out = compile_atlases(&[source.clone()], &cfg).expect("compile");
    let canvas = out.atlases[0].canvas();
    assert_eq!(canvas.dimensions(), (17, 17));
    assert_eq!(canvas.get_pixel(7, 7)[3], 0);
    assert_eq!(canvas.get_pixel(0, 0)[3], 255);
}

#[test]
fn crop_full_without_islands_keeps_whole_source() {
    let source = SourceAsset::from_rgba("empty", "empty.png", RgbaImage::new(5, 3));
    let cfg = AtlasConfig::builder()
        .island_mode(IslandMode::CropFull)
        .build();
    let subs = cut_source(&source, &cfg);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].region(), Rect::new(0, 0, 5, 3));
    assert!(subs[0].mask().is_none());
}

#[test]
fn crop_largest_and_many_drop_empty_sources() {
    let source = SourceAsset::from_rgba("empty", "empty.png", RgbaImage::new(5, 3));
    for mode in [IslandMode::CropLargest, IslandMode::CropMany] {
        let cfg = AtlasConfig::builder().island_mode(mode).build();
        assert!(cut_source(&source, &cfg).is_empty(), "{mode:?}");
    }
    let cfg = AtlasConfig::builder()
        .island_mode(IslandMode::CropMany)
        .build();
    let out = compile_atlases(&[source], &cfg).expect("compile");
    assert!(out.atlases[0].is_empty());
}

#[test]
fn separation_pattern_routes_to_distinct_atlases() {
    let sources = vec![solid("tile_a1", 4, 4), solid("tile_b1", 2, 2)];
    let cfg = AtlasConfig::builder()
        .separate_pattern("[ab]1")
        .target_name("tiles.png")
        .build();
    let out = compile_atlases(&sources, &cfg).expect("compile");
    assert_eq!(out.atlases.len(), 2);

    let a = &out.atlases[0];
    assert_eq!(a.key(), "a1");
    assert_eq!(a.name(), "tilesa1.png");
    assert_eq!(a.records().len(), 1);
    assert_eq!(a.records()[0].name, "tile_a1");

    let b = &out.atlases[1];
    assert_eq!(b.name(), "tilesb1.png");
    assert_eq!(b.records().len(), 1);
    assert_eq!(b.records()[0].name, "tile_b1");
    assert_eq!(b.canvas().dimensions(), (2, 2));

    let doc = out.document();
    assert_eq!(doc["tilesa1.png"][0]["target_region"]["w"], 4);
    assert_eq!(doc["tilesb1.png"][0]["source_offset"]["x"], 0);
}

#[test]
fn unmatched_name_aborts_run() {
    let sources = vec![solid("tile_a1", 4, 4), solid("tile_c2", 4, 4)];
    let cfg = AtlasConfig::builder().separate_pattern("[ab]1").build();
    match compile_atlases(&sources, &cfg) {
        Err(AtlasError::Classification { name, pattern }) => {
            assert_eq!(name, "tile_c2");
            assert_eq!(pattern, "[ab]1");
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected classification error"),
    }
}

#[test]
fn limit_truncates_sources() {
    let sources = vec![solid("a", 2, 2), solid("b", 2, 2), solid("c", 2, 2)];
    let cfg = AtlasConfig::builder().limit(Some(2)).build();
    let out = compile_atlases(&sources, &cfg).expect("compile");
    let names: Vec<&str> = out.atlases[0]
        .records()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(
        compile_atlases(&[], &AtlasConfig::default()),
        Err(AtlasError::Empty)
    ));
}
