use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a source image is cut into packable regions.
/// Key notes:
///   - every mode except `NoCrop` runs island extraction first
///   - `CropLargest` ranks islands by bounding-box area, not pixel count, so a
///     sparse but spread-out island outranks a dense compact one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IslandMode {
    /// Pack the whole image untouched.
    #[default]
    NoCrop,
    /// One region covering every island; pixels outside islands are masked out.
    CropFull,
    /// Only the island with the largest bounding box.
    #[serde(alias = "crop_single")]
    CropLargest,
    /// One region per island. Good for spritesheets.
    CropMany,
}

impl IslandMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCrop => "no_crop",
            Self::CropFull => "crop_full",
            Self::CropLargest => "crop_largest",
            Self::CropMany => "crop_many",
        }
    }

    /// True when the mode needs island extraction.
    pub fn uses_islands(&self) -> bool {
        !matches!(self, Self::NoCrop)
    }
}

impl FromStr for IslandMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no_crop" | "none" => Ok(Self::NoCrop),
            "crop_full" | "full" => Ok(Self::CropFull),
            "crop_largest" | "crop_single" | "largest" => Ok(Self::CropLargest),
            "crop_many" | "many" => Ok(Self::CropMany),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasConfig {
    /// Cropping policy applied to every source.
    #[serde(default)]
    pub island_mode: IslandMode,
    /// Pixels with alpha >= this are occupied.
    #[serde(default = "default_opacity_threshold")]
    pub opacity_threshold: u8,
    /// Islands with fewer member pixels are discarded.
    #[serde(default = "default_min_island_area")]
    pub min_island_area: u32,
    /// Regex applied to each source name; the matched text picks the atlas.
    /// Empty puts everything in one atlas.
    #[serde(default)]
    pub separate_pattern: String,
    /// Atlas file name template; the routing key is inserted before the extension.
    #[serde(default = "default_target_name")]
    pub target_name: String,
    /// Only process the first N sources.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Extract islands on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            island_mode: IslandMode::default(),
            opacity_threshold: default_opacity_threshold(),
            min_island_area: default_min_island_area(),
            separate_pattern: String::new(),
            target_name: default_target_name(),
            limit: None,
            parallel: false,
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `target_name` is empty
    /// - `limit` is `Some(0)`
    /// - `separate_pattern` is not a valid regex
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.target_name.trim().is_empty() {
            return Err(AtlasError::InvalidConfig(
                "target_name must not be empty".into(),
            ));
        }
        if self.limit == Some(0) {
            return Err(AtlasError::InvalidConfig(
                "limit must be at least 1 when set".into(),
            ));
        }
        regex::Regex::new(&self.separate_pattern).map_err(|source| {
            AtlasError::InvalidPattern {
                pattern: self.separate_pattern.clone(),
                source,
            }
        })?;
        Ok(())
    }
}

fn default_opacity_threshold() -> u8 {
    16
}
fn default_min_island_area() -> u32 {
    1
}
fn default_target_name() -> String {
    "atlas.png".into()
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn island_mode(mut self, v: IslandMode) -> Self {
        self.cfg.island_mode = v;
        self
    }
    pub fn opacity_threshold(mut self, v: u8) -> Self {
        self.cfg.opacity_threshold = v;
        self
    }
    pub fn min_island_area(mut self, v: u32) -> Self {
        self.cfg.min_island_area = v;
        self
    }
    pub fn separate_pattern(mut self, v: impl Into<String>) -> Self {
        self.cfg.separate_pattern = v.into();
        self
    }
    pub fn target_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.target_name = v.into();
        self
    }
    pub fn limit(mut self, v: Option<usize>) -> Self {
        self.cfg.limit = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

impl AtlasConfig {
    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}
