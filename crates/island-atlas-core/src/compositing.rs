use crate::model::{Bitmap, Rect};
use image::RgbaImage;

/// Copy the sub-rectangle `region` of `src` into `canvas` at destination (dx, dy).
///
/// - Pixels are overwritten, not blended.
/// - With a `mask` (sized like `region`), alpha becomes `min(mask ? 255 : 0, alpha)`;
///   color channels are copied untouched.
/// - Destination pixels outside `canvas` are skipped.
pub fn blit_masked(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    region: Rect,
    mask: Option<&Bitmap>,
) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..region.h {
        for xx in 0..region.w {
            let (sx, sy) = (region.x + xx, region.y + yy);
            if sx >= sw || sy >= sh || dx + xx >= cw || dy + yy >= ch {
                continue;
            }
            let mut px = *src.get_pixel(sx, sy);
            if let Some(m) = mask {
                let limit = if m.get(xx, yy) { 255 } else { 0 };
                px[3] = px[3].min(limit);
            }
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

/// Returns `canvas` enlarged to `w`x`h`, keeping its content at the top-left.
/// New pixels are transparent. Never shrinks.
pub fn grow_canvas(canvas: RgbaImage, w: u32, h: u32) -> RgbaImage {
    let (cw, ch) = canvas.dimensions();
    if w <= cw && h <= ch {
        return canvas;
    }
    let mut grown = RgbaImage::new(w.max(cw), h.max(ch));
    for (x, y, px) in canvas.enumerate_pixels() {
        grown.put_pixel(x, y, *px);
    }
    grown
}
