use crate::model::{Anchor, Rect};
use tracing::debug;

/// Outcome of a single placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Rectangle assigned on the canvas.
    pub rect: Rect,
    /// True if the canvas had to grow to contain `rect`.
    pub grew: bool,
    /// True if no anchor was collision-free and the oldest anchor was reused.
    pub fallback: bool,
}

/// Greedy snap-point packer.
///
/// Every placement consumes the anchor it was put on and offers its top-right
/// and bottom-left corners as new anchors. Anchors are tried in insertion order;
/// ones whose rectangle stays inside the current canvas win over ones that
/// would grow it. The result depends only on the order of `place` calls.
#[derive(Debug, Clone)]
pub struct SnapPacker {
    anchors: Vec<Anchor>,
    placed: Vec<Rect>,
    canvas: Rect,
}

impl Default for SnapPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapPacker {
    /// Empty packer with a 1x1 canvas and a single anchor at the origin.
    pub fn new() -> Self {
        Self {
            anchors: vec![Anchor::new(0, 0)],
            placed: Vec::new(),
            canvas: Rect::sized(1, 1),
        }
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }
    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    fn collides(&self, rect: &Rect) -> bool {
        self.placed.iter().any(|p| p.intersects(rect))
    }

    /// Picks the anchor for a `w`x`h` rectangle, returning it and whether it collides.
    fn choose(&self, w: u32, h: u32) -> (Anchor, bool) {
        let mut outside: Option<Anchor> = None;
        for anchor in &self.anchors {
            let rect = anchor.rect(w, h);
            if self.collides(&rect) {
                continue;
            }
            if self.canvas.contains(&rect) {
                return (*anchor, false);
            }
            outside.get_or_insert(*anchor);
        }
        match outside {
            Some(anchor) => (anchor, false),
            // Degenerate: every anchor collides. Reuse the oldest one anyway.
            None => (
                self.anchors.first().copied().unwrap_or(Anchor::new(0, 0)),
                true,
            ),
        }
    }

    /// Places a `w`x`h` rectangle, growing the canvas if needed.
    pub fn place(&mut self, w: u32, h: u32) -> Placement {
        let (anchor, fallback) = self.choose(w, h);
        let rect = anchor.rect(w, h);

        let grew = !self.canvas.contains(&rect);
        if grew {
            let canvas = self.canvas.union(&rect);
            debug!(from = ?(self.canvas.w, self.canvas.h), to = ?(canvas.w, canvas.h), "canvas grown");
            self.canvas = canvas;
        }
        self.placed.push(rect);

        if let Some(i) = self.anchors.iter().position(|a| *a == anchor) {
            self.anchors.remove(i);
        }
        for next in [Anchor::new(rect.right(), rect.y), Anchor::new(rect.x, rect.bottom())] {
            if !self.anchors.contains(&next) {
                self.anchors.push(next);
            }
        }

        Placement {
            rect,
            grew,
            fallback,
        }
    }
}
