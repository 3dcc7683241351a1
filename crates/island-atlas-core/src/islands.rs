use crate::model::{Bitmap, Rect};
use tracing::trace;

/// A maximal 4-connected group of occupied pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    /// Bounding rectangle in source space.
    pub rect: Rect,
    /// Membership mask local to `rect` (`mask.get(x - rect.x, y - rect.y)`).
    pub mask: Bitmap,
    /// Number of member pixels.
    pub area: u32,
}

impl Island {
    /// Whether the source-space pixel `(x, y)` belongs to this island.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.rect.x
            && y >= self.rect.y
            && self.mask.get(x - self.rect.x, y - self.rect.y)
    }
}

/// Labels the 4-connected components of `occupied` and keeps those with at least
/// `min_area` pixels.
///
/// Scan order is column-major (x outer, y inner); the returned islands are in
/// first-discovery order under that scan, which fixes the emission order of
/// `IslandMode::CropMany`. Discarded components stay visited.
pub fn extract_islands(occupied: &Bitmap, min_area: u32) -> Vec<Island> {
    let (w, h) = occupied.dimensions();
    let mut visited = Bitmap::new(w, h);
    let mut islands = Vec::new();
    // Reused across components; flood fill never recurses.
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(((w as usize) + (h as usize)) * 2);
    let mut members: Vec<(u32, u32)> = Vec::new();

    for x in 0..w {
        for y in 0..h {
            if visited.get(x, y) || !occupied.get(x, y) {
                continue;
            }
            members.clear();
            stack.clear();
            visited.set(x, y, true);
            stack.push((x, y));
            let (mut x1, mut y1, mut x2, mut y2) = (x, y, x, y);

            while let Some((px, py)) = stack.pop() {
                members.push((px, py));
                x1 = x1.min(px);
                y1 = y1.min(py);
                x2 = x2.max(px);
                y2 = y2.max(py);

                let mut visit = |nx: u32, ny: u32| {
                    if occupied.get(nx, ny) && !visited.get(nx, ny) {
                        visited.set(nx, ny, true);
                        stack.push((nx, ny));
                    }
                };
                if px + 1 < w {
                    visit(px + 1, py);
                }
                if px > 0 {
                    visit(px - 1, py);
                }
                if py + 1 < h {
                    visit(px, py + 1);
                }
                if py > 0 {
                    visit(px, py - 1);
                }
            }

            let area = members.len() as u32;
            let rect = Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1);
            if area < min_area {
                trace!(?rect, area, min_area, "discarding small island");
                continue;
            }
            let mut mask = Bitmap::new(rect.w, rect.h);
            for &(mx, my) in &members {
                mask.set(mx - rect.x, my - rect.y, true);
            }
            islands.push(Island { rect, mask, area });
        }
    }
    islands
}
