use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Rectangle of size `(w, h)` anchored at the origin.
    pub fn sized(w: u32, h: u32) -> Self {
        Self::new(0, 0, w, h)
    }
    /// Exclusive right edge coordinate (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    pub fn origin(&self) -> Anchor {
        Anchor::new(self.x, self.y)
    }
    /// Returns true if `r` is fully inside `self` (edges may touch).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the interiors overlap. Touching edges and empty rectangles never intersect.
    pub fn intersects(&self, r: &Rect) -> bool {
        if self.is_empty() || r.is_empty() {
            return false;
        }
        self.x < r.right() && r.x < self.right() && self.y < r.bottom() && r.y < self.bottom()
    }
    /// Smallest rectangle covering both `self` and `r`.
    pub fn union(&self, r: &Rect) -> Rect {
        let x = self.x.min(r.x);
        let y = self.y.min(r.y);
        let right = self.right().max(r.right());
        let bottom = self.bottom().max(r.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Candidate top-left coordinate for the next placement on an atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub x: u32,
    pub y: u32,
}

impl Anchor {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
    pub fn rect(&self, w: u32, h: u32) -> Rect {
        Rect::new(self.x, self.y, w, h)
    }
}

/// Dense binary grid. Used for whole-image occupancy and for island-local masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Bitmap {
    /// All-clear bitmap of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Out-of-range coordinates read as clear.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.bits[i] = value;
        }
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Coordinates of every set cell, row by row.
    pub fn iter_set(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| ((i % w) as u32, (i / w) as u32))
    }
}

/// Source-space origin of a placed region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceOffset {
    pub x: u32,
    pub y: u32,
}

/// One placement on an atlas, in packing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementRecord {
    /// Display name of the source the region was cut from.
    pub name: String,
    /// Top-left of the region inside its source image.
    pub source_offset: SourceOffset,
    /// Rectangle the region occupies on the atlas canvas.
    pub target_region: Rect,
}

/// Statistics about a compiled atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AtlasStats {
    /// Number of placed regions.
    pub entries: usize,
    /// Final canvas dimensions.
    pub width: u32,
    pub height: u32,
    /// Canvas area (width * height).
    pub canvas_area: u64,
    /// Sum of placed region areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0). Can exceed 1.0 only when the
    /// packer fell back to an overlapping placement.
    pub occupancy: f64,
    /// Placements that reused the oldest anchor despite a collision.
    pub fallback_overlaps: usize,
}

impl AtlasStats {
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Entries: {}, Size: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px², Overlaps: {}",
            self.entries,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.used_area,
            self.wasted_area(),
            self.fallback_overlaps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 4, 4);
        assert!(!a.intersects(&Rect::new(4, 0, 4, 4)));
        assert!(!a.intersects(&Rect::new(0, 4, 4, 4)));
        assert!(a.intersects(&Rect::new(3, 3, 4, 4)));
        assert!(!a.intersects(&Rect::new(1, 1, 0, 2)));
    }

    #[test]
    fn union_covers_both() {
        let u = Rect::new(0, 0, 1, 1).union(&Rect::new(4, 0, 4, 4));
        assert_eq!(u, Rect::new(0, 0, 8, 4));
        assert!(u.contains(&Rect::new(4, 0, 4, 4)));
        assert!(!u.contains(&Rect::new(0, 4, 8, 8)));
    }

    #[test]
    fn bitmap_iterates_row_major() {
        let mut b = Bitmap::new(3, 2);
        b.set(2, 0, true);
        b.set(0, 1, true);
        b.set(9, 9, true);
        assert_eq!(b.iter_set().collect::<Vec<_>>(), vec![(2, 0), (0, 1)]);
        assert_eq!(b.count(), 2);
        assert!(!b.get(9, 9));
    }
}
