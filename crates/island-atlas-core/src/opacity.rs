use crate::model::Bitmap;
use image::RgbaImage;

/// Occupancy grid of `rgba`: a cell is set when its alpha is at least `threshold`.
///
/// A threshold of 0 marks every pixel occupied.
pub fn classify_opacity(rgba: &RgbaImage, threshold: u8) -> Bitmap {
    let (w, h) = rgba.dimensions();
    let mut mask = Bitmap::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        if px[3] >= threshold {
            mask.set(x, y, true);
        }
    }
    mask
}
