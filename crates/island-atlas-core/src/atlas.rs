use crate::compositing::{blit_masked, grow_canvas};
use crate::model::{AtlasStats, PlacementRecord, Rect, SourceOffset};
use crate::packer::SnapPacker;
use crate::region::SubImage;
use crate::router::Routing;
use image::RgbaImage;
use tracing::{debug, warn};

/// One output canvas plus the records of everything placed on it.
#[derive(Debug, Clone)]
pub struct Atlas {
    name: String,
    key: String,
    packer: SnapPacker,
    canvas: RgbaImage,
    records: Vec<PlacementRecord>,
    fallback_overlaps: usize,
}

impl Atlas {
    /// Empty atlas with a 1x1 transparent canvas.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            packer: SnapPacker::new(),
            canvas: RgbaImage::new(1, 1),
            records: Vec::new(),
            fallback_overlaps: 0,
        }
    }

    /// Output name (the target template with the routing key spliced in).
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Routing key this atlas collects.
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
    /// Placement records in packing order.
    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Packs `sub`, composites its pixels and appends its record.
    pub fn add(&mut self, sub: &SubImage<'_>) -> &PlacementRecord {
        let (w, h) = sub.size();
        let placement = self.packer.place(w, h);
        let target = placement.rect;
        if placement.fallback {
            self.fallback_overlaps += 1;
            warn!(atlas = %self.name, name = sub.name(), ?target, "no free anchor; placement overlaps");
        }
        if placement.grew {
            let canvas = self.packer.canvas();
            let old = std::mem::replace(&mut self.canvas, RgbaImage::new(0, 0));
            self.canvas = grow_canvas(old, canvas.right(), canvas.bottom());
        }

        let region = sub.region();
        blit_masked(
            &sub.source().image,
            &mut self.canvas,
            target.x,
            target.y,
            region,
            sub.mask(),
        );
        debug!(atlas = %self.name, name = sub.name(), ?region, ?target, "placed");

        self.records.push(PlacementRecord {
            name: sub.name().to_string(),
            source_offset: SourceOffset {
                x: region.x,
                y: region.y,
            },
            target_region: target,
        });
        &self.records[self.records.len() - 1]
    }

    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> AtlasStats {
        let (width, height) = self.canvas.dimensions();
        let canvas_area = Rect::sized(width, height).area();
        let used_area: u64 = self.records.iter().map(|r| r.target_region.area()).sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        AtlasStats {
            entries: self.records.len(),
            width,
            height,
            canvas_area,
            used_area,
            occupancy,
            fallback_overlaps: self.fallback_overlaps,
        }
    }
}

/// Atlases of one run, indexed like the routing keys that created them.
/// Membership is fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct AtlasSet {
    atlases: Vec<Atlas>,
}

impl AtlasSet {
    pub fn from_routing(routing: &Routing) -> Self {
        let atlases = routing
            .keys
            .iter()
            .zip(&routing.names)
            .map(|(key, name)| Atlas::new(name.clone(), key.clone()))
            .collect();
        Self { atlases }
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }
    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }
    pub fn get(&self, idx: usize) -> Option<&Atlas> {
        self.atlases.get(idx)
    }
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Atlas> {
        self.atlases.get_mut(idx)
    }
    pub fn by_key(&self, key: &str) -> Option<&Atlas> {
        self.atlases.iter().find(|a| a.key == key)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Atlas> {
        self.atlases.iter()
    }
    pub fn into_atlases(self) -> Vec<Atlas> {
        self.atlases
    }
}
