use island_atlas_core::model::Rect;
use island_atlas_core::packer::{Placement, SnapPacker};
use rand::{Rng, SeedableRng};

fn random_sizes(seed: u64, n: usize) -> Vec<(u32, u32)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(1..=48), rng.gen_range(1..=48)))
        .collect()
}

fn pack_all(sizes: &[(u32, u32)]) -> (Vec<Placement>, Vec<Rect>) {
    let mut packer = SnapPacker::new();
    let mut canvases = Vec::with_capacity(sizes.len());
    let placements = sizes
        .iter()
        .map(|&(w, h)| {
            let p = packer.place(w, h);
            canvases.push(packer.canvas());
            p
        })
        .collect();
    (placements, canvases)
}

#[test]
fn placements_never_overlap_earlier_ones() {
    for seed in [1, 7, 42, 1234] {
        let sizes = random_sizes(seed, 150);
        let (placements, _) = pack_all(&sizes);
        for (i, p) in placements.iter().enumerate() {
            if p.fallback {
                continue;
            }
            for q in &placements[..i] {
                assert!(
                    !p.rect.intersects(&q.rect),
                    "seed {seed}: {:?} overlaps {:?}",
                    p.rect,
                    q.rect
                );
            }
        }
    }
}

#[test]
fn canvas_grows_monotonically_and_covers_placements() {
    let sizes = random_sizes(99, 200);
    let (placements, canvases) = pack_all(&sizes);
    let mut prev = Rect::sized(1, 1);
    for (p, canvas) in placements.iter().zip(&canvases) {
        assert_eq!((canvas.x, canvas.y), (0, 0));
        assert!(canvas.w >= prev.w && canvas.h >= prev.h);
        assert!(canvas.contains(&p.rect));
        assert_eq!(p.grew, canvas != &prev);
        prev = *canvas;
    }
}

#[test]
fn same_order_same_layout() {
    let sizes = random_sizes(5, 120);
    let (a, ca) = pack_all(&sizes);
    let (b, cb) = pack_all(&sizes);
    assert_eq!(a, b);
    assert_eq!(ca, cb);
}

#[test]
fn order_changes_layout() {
    let sizes = vec![(4, 4), (4, 4), (8, 8)];
    let mut reversed = sizes.clone();
    reversed.reverse();
    let (a, _) = pack_all(&sizes);
    let (b, _) = pack_all(&reversed);
    assert_ne!(
        a.iter().map(|p| p.rect).collect::<Vec<_>>(),
        b.iter().map(|p| p.rect).collect::<Vec<_>>()
    );
}

#[test]
fn identical_tiles_fill_a_square_without_gaps() {
    let (placements, canvases) = pack_all(&[(8, 8); 16]);
    assert!(placements.iter().all(|p| !p.fallback));
    assert_eq!(canvases.last().copied(), Some(Rect::sized(32, 32)));
    assert_eq!(placements[3].rect, Rect::new(8, 8, 8, 8));
    assert_eq!(placements[15].rect, Rect::new(24, 24, 8, 8));
}
