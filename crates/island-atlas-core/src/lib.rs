//! Core library for compiling sprites into texture atlases.
//!
//! - Islands: alpha threshold -> occupancy grid -> 4-connected components
//! - Crop policies: no_crop / crop_full / crop_largest / crop_many
//! - Packing: greedy snap-point packer on a canvas that grows as needed
//! - Output: one RGBA canvas per atlas plus ordered placement records (JSON)
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use island_atlas_core::{AtlasConfig, IslandMode, SourceAsset, compile_atlases};
//! # fn main() -> anyhow::Result<()> {
//! let sheet = ImageReader::open("sheet.png")?.decode()?;
//! let sources = vec![SourceAsset::new("sheet", "sheet.png", sheet)];
//! let cfg = AtlasConfig::builder().island_mode(IslandMode::CropMany).build();
//! let out = compile_atlases(&sources, &cfg)?;
//! println!("{}", serde_json::to_string_pretty(&out.document())?);
//! # Ok(()) }
//! ```

pub mod atlas;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod islands;
pub mod model;
pub mod opacity;
pub mod packer;
pub mod pipeline;
pub mod region;
pub mod router;

pub use atlas::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use islands::*;
pub use model::*;
pub use opacity::*;
pub use packer::*;
pub use pipeline::*;
pub use region::*;
pub use router::*;

/// Convenience prelude for common types and functions.
/// Importing `island_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::atlas::{Atlas, AtlasSet};
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, IslandMode};
    pub use crate::islands::{Island, extract_islands};
    pub use crate::model::{Anchor, AtlasStats, Bitmap, PlacementRecord, Rect, SourceOffset};
    pub use crate::opacity::classify_opacity;
    pub use crate::packer::{Placement, SnapPacker};
    pub use crate::region::{SubImage, select_regions};
    pub use crate::router::TargetRouter;
    pub use crate::{CompileOutput, SourceAsset, compile_atlases, cut_source};
}
