use crate::atlas::{Atlas, AtlasSet};
use crate::config::{AtlasConfig, IslandMode};
use crate::error::{AtlasError, Result};
use crate::islands::extract_islands;
use crate::model::AtlasStats;
use crate::opacity::classify_opacity;
use crate::region::{SubImage, select_regions};
use crate::router::TargetRouter;
use image::{DynamicImage, RgbaImage};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Decoded sprite with a stable identity.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    /// Display name (file stem); also what the separation pattern is matched against.
    pub name: String,
    /// Where the image came from.
    pub origin: PathBuf,
    pub image: RgbaImage,
}

impl SourceAsset {
    pub fn new(name: impl Into<String>, origin: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self::from_rgba(name, origin, image.to_rgba8())
    }

    pub fn from_rgba(name: impl Into<String>, origin: impl Into<PathBuf>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            image,
        }
    }
}

/// Output of a run: every atlas with its canvas and records, in routing-key order.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub atlases: Vec<Atlas>,
}

impl CompileOutput {
    /// Placement document keyed by atlas name.
    pub fn document(&self) -> Value {
        crate::export::to_json(&self.atlases)
    }

    /// Per-atlas statistics, in atlas order.
    pub fn stats(&self) -> Vec<(String, AtlasStats)> {
        self.atlases
            .iter()
            .map(|a| (a.name().to_string(), a.stats()))
            .collect()
    }
}

#[instrument(skip_all)]
/// Compiles `sources` into atlases according to `cfg`.
///
/// Notes:
/// - Routing runs over every source before anything is packed; one unmatched
///   name fails the whole run with `AtlasError::Classification`.
/// - Sources are packed in the given order, which fully determines the layout.
/// - With `parallel`, island extraction runs on rayon; packing stays sequential.
pub fn compile_atlases(sources: &[SourceAsset], cfg: &AtlasConfig) -> Result<CompileOutput> {
    cfg.validate()?;

    let sources = match cfg.limit {
        Some(n) if n < sources.len() => &sources[..n],
        _ => sources,
    };
    if sources.is_empty() {
        return Err(AtlasError::Empty);
    }

    let router = TargetRouter::new(&cfg.separate_pattern, cfg.target_name.clone())?;
    let routing = router.route(sources)?;
    let mut set = AtlasSet::from_routing(&routing);
    info!(sources = sources.len(), atlases = set.len(), "routed sources");

    let cuts = cut_sources(sources, cfg);
    for (subs, &slot) in cuts.iter().zip(&routing.assignments) {
        let Some(atlas) = set.get_mut(slot) else {
            continue;
        };
        for sub in subs {
            atlas.add(sub);
        }
    }

    for atlas in set.iter() {
        let stats = atlas.stats();
        info!(atlas = atlas.name(), summary = %stats.summary(), "atlas compiled");
    }
    Ok(CompileOutput {
        atlases: set.into_atlases(),
    })
}

fn cut_sources<'a>(sources: &'a [SourceAsset], cfg: &AtlasConfig) -> Vec<Vec<SubImage<'a>>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            // collect() keeps source order, which packing depends on.
            return sources.par_iter().map(|s| cut_source(s, cfg)).collect();
        }
    }
    sources.iter().map(|s| cut_source(s, cfg)).collect()
}

/// Runs classification, island extraction and region selection for one source.
pub fn cut_source<'a>(source: &'a SourceAsset, cfg: &AtlasConfig) -> Vec<SubImage<'a>> {
    if !cfg.island_mode.uses_islands() {
        return select_regions(source, &[], IslandMode::NoCrop);
    }
    let occupied = classify_opacity(&source.image, cfg.opacity_threshold);
    let islands = extract_islands(&occupied, cfg.min_island_area);
    trace!(name = %source.name, islands = islands.len(), "islands extracted");
    let subs = select_regions(source, &islands, cfg.island_mode);
    if subs.is_empty() {
        info!(name = %source.name, mode = cfg.island_mode.as_str(), "no islands; source skipped");
    }
    subs
}
