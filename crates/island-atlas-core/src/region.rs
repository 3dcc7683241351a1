use crate::config::IslandMode;
use crate::error::{AtlasError, Result};
use crate::islands::Island;
use crate::model::{Bitmap, Rect};
use crate::pipeline::SourceAsset;

/// A packable region cut from a source image.
#[derive(Debug, Clone)]
pub struct SubImage<'a> {
    source: &'a SourceAsset,
    region: Rect,
    mask: Option<Bitmap>,
}

impl<'a> SubImage<'a> {
    /// The whole source, unmasked.
    pub fn whole(source: &'a SourceAsset) -> Self {
        let (w, h) = source.image.dimensions();
        Self {
            source,
            region: Rect::sized(w, h),
            mask: None,
        }
    }

    /// A region of `source` limited by `mask`, which must match the region size.
    pub fn masked(source: &'a SourceAsset, region: Rect, mask: Bitmap) -> Result<Self> {
        if mask.dimensions() != (region.w, region.h) {
            return Err(AtlasError::DimensionMismatch {
                expected: (region.w, region.h),
                actual: mask.dimensions(),
            });
        }
        let (sw, sh) = source.image.dimensions();
        if !Rect::sized(sw, sh).contains(&region) {
            return Err(AtlasError::DimensionMismatch {
                expected: (sw, sh),
                actual: (region.right(), region.bottom()),
            });
        }
        Ok(Self {
            source,
            region,
            mask: Some(mask),
        })
    }

    fn from_island(source: &'a SourceAsset, island: &Island) -> Self {
        Self {
            source,
            region: island.rect,
            mask: Some(island.mask.clone()),
        }
    }

    pub fn source(&self) -> &'a SourceAsset {
        self.source
    }
    /// Display name, shared by every region cut from the same source.
    pub fn name(&self) -> &'a str {
        &self.source.name
    }
    /// Source-space bounding rectangle.
    pub fn region(&self) -> Rect {
        self.region
    }
    pub fn mask(&self) -> Option<&Bitmap> {
        self.mask.as_ref()
    }
    pub fn size(&self) -> (u32, u32) {
        (self.region.w, self.region.h)
    }
}

/// Applies `mode` to `source` given its surviving islands.
///
/// `CropLargest` and `CropMany` yield nothing when no island survived;
/// `CropFull` falls back to the whole image.
pub fn select_regions<'a>(
    source: &'a SourceAsset,
    islands: &[Island],
    mode: IslandMode,
) -> Vec<SubImage<'a>> {
    match mode {
        IslandMode::NoCrop => vec![SubImage::whole(source)],
        IslandMode::CropFull => match merge_islands(islands) {
            Some((region, mask)) => vec![SubImage {
                source,
                region,
                mask: Some(mask),
            }],
            None => vec![SubImage::whole(source)],
        },
        IslandMode::CropLargest => largest_island(islands)
            .map(|island| SubImage::from_island(source, island))
            .into_iter()
            .collect(),
        IslandMode::CropMany => islands
            .iter()
            .map(|island| SubImage::from_island(source, island))
            .collect(),
    }
}

/// Bounding union of all islands and the union of their pixel sets, local to it.
fn merge_islands(islands: &[Island]) -> Option<(Rect, Bitmap)> {
    let region = islands
        .iter()
        .map(|i| i.rect)
        .reduce(|acc, r| acc.union(&r))?;
    let mut mask = Bitmap::new(region.w, region.h);
    for island in islands {
        let ox = island.rect.x - region.x;
        let oy = island.rect.y - region.y;
        for (lx, ly) in island.mask.iter_set() {
            mask.set(ox + lx, oy + ly, true);
        }
    }
    Some((region, mask))
}

/// Island with the greatest bounding-box area; the earliest wins ties.
fn largest_island(islands: &[Island]) -> Option<&Island> {
    islands.iter().fold(None, |best: Option<&Island>, island| match best {
        Some(b) if b.rect.area() >= island.rect.area() => Some(b),
        _ => Some(island),
    })
}
