use crate::atlas::Atlas;
use serde_json::{Map, Value, json};

/// Placement document: `{ "<atlas name>": [ { name, source_offset, target_region }, ... ] }`.
/// Records keep packing order.
pub fn to_json(atlases: &[Atlas]) -> Value {
    let mut doc = Map::new();
    for atlas in atlases {
        doc.insert(atlas.name().to_string(), records_value(atlas));
    }
    Value::Object(doc)
}

/// Same as `to_json`, plus a top-level `"stats"` object keyed by atlas name.
/// Shape: `{ "<atlas name>": [...], "stats": { "<atlas name>": { entries, width, height, ... } } }`.
pub fn to_json_with_stats(atlases: &[Atlas]) -> Value {
    let mut doc = match to_json(atlases) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let stats: Map<String, Value> = atlases
        .iter()
        .map(|a| (a.name().to_string(), json!(a.stats())))
        .collect();
    doc.insert("stats".into(), Value::Object(stats));
    Value::Object(doc)
}

fn records_value(atlas: &Atlas) -> Value {
    let records: Vec<Value> = atlas
        .records()
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "source_offset": {"x": r.source_offset.x, "y": r.source_offset.y},
                "target_region": {
                    "x": r.target_region.x,
                    "y": r.target_region.y,
                    "w": r.target_region.w,
                    "h": r.target_region.h,
                },
            })
        })
        .collect();
    Value::Array(records)
}
