use crate::error::{AtlasError, Result};
use crate::pipeline::SourceAsset;
use regex::Regex;
use std::path::Path;

/// Assigns sources to atlases by matching a regex against their names.
#[derive(Debug, Clone)]
pub struct TargetRouter {
    pattern: Regex,
    template: String,
}

/// Result of routing a batch of sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    /// Distinct routing keys in first-seen order.
    pub keys: Vec<String>,
    /// Output name for each key, parallel to `keys`.
    pub names: Vec<String>,
    /// Index into `keys` for every routed source, in source order.
    pub assignments: Vec<usize>,
}

impl TargetRouter {
    pub fn new(pattern: &str, template: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| AtlasError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            template: template.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Text of the first match in `name`. Fails when the pattern does not match at all.
    pub fn route_key<'n>(&self, name: &'n str) -> Result<&'n str> {
        self.pattern
            .find(name)
            .map(|m| m.as_str())
            .ok_or_else(|| AtlasError::Classification {
                name: name.to_string(),
                pattern: self.pattern.as_str().to_string(),
            })
    }

    /// Output name for `key`: the key is inserted before the template's extension.
    pub fn target_name(&self, key: &str) -> String {
        if key.is_empty() {
            return self.template.clone();
        }
        let path = Path::new(&self.template);
        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) => {
                let file = format!("{}{}.{}", stem.to_string_lossy(), key, ext.to_string_lossy());
                match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    Some(parent) => parent.join(file).to_string_lossy().into_owned(),
                    None => file,
                }
            }
            _ => format!("{}{}", self.template, key),
        }
    }

    /// Routes every source; the first unmatched name aborts the whole batch.
    pub fn route(&self, sources: &[SourceAsset]) -> Result<Routing> {
        let mut keys: Vec<String> = Vec::new();
        let mut assignments = Vec::with_capacity(sources.len());
        for source in sources {
            let key = self.route_key(&source.name)?;
            let idx = match keys.iter().position(|k| k == key) {
                Some(i) => i,
                None => {
                    keys.push(key.to_string());
                    keys.len() - 1
                }
            };
            assignments.push(idx);
        }
        let names = keys.iter().map(|k| self.target_name(k)).collect();
        Ok(Routing {
            keys,
            names,
            assignments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_spliced_before_extension() {
        let r = TargetRouter::new("[ab]1", "atlas.png").expect("router");
        assert_eq!(r.target_name("a1"), "atlasa1.png");
        assert_eq!(r.target_name(""), "atlas.png");
    }

    #[test]
    fn template_without_extension_appends() {
        let r = TargetRouter::new("", "sheet").expect("router");
        assert_eq!(r.target_name("x"), "sheetx");
    }

    #[test]
    fn nested_template_keeps_directory() {
        let r = TargetRouter::new("", "ui/atlas.png").expect("router");
        let name = r.target_name("_big").replace('\\', "/");
        assert_eq!(name, "ui/atlas_big.png");
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let r = TargetRouter::new("", "atlas.png").expect("router");
        assert_eq!(r.route_key("anything").expect("key"), "");
    }

    #[test]
    fn unmatched_name_is_classification_error() {
        let r = TargetRouter::new("[ab]1", "atlas.png").expect("router");
        match r.route_key("tile_c2") {
            Err(AtlasError::Classification { name, .. }) => assert_eq!(name, "tile_c2"),
            other => panic!("expected classification error, got {other:?}"),
        }
    }

    #[test]
    fn bad_regex_is_reported() {
        assert!(matches!(
            TargetRouter::new("(", "atlas.png"),
            Err(AtlasError::InvalidPattern { .. })
        ));
    }
}
