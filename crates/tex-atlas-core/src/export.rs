use crate::builder::{AtlasBuilder, remap};
use crate::diagnostics::DiagnosticSink;
use serde_json::{Value, json};
use std::fmt::Debug;
use std::hash::Hash;

/// Serialize the result of a build as `{ atlases, unplaced, stats }`.
///
/// Each atlas lists its members with their content rect and UV transform;
/// `unplaced` names every candidate that keeps its own image.
pub fn to_json_manifest<K, S>(builder: &AtlasBuilder<K, S>) -> Value
where
    K: Eq + Hash + Clone + Debug + ToString,
    S: DiagnosticSink<K>,
{
    let registry = builder.candidates();
    let atlases_val = builder
        .atlases()
        .iter()
        .map(|atlas| {
            let members: Vec<Value> = atlas
                .members()
                .iter()
                .filter_map(|&id| registry.get(id))
                .filter_map(|c| {
                    let p = c.placement()?;
                    let t = remap(c, atlas);
                    Some(json!({
                        "key": c.key.to_string(),
                        "frame": {"x": p.x, "y": p.y, "w": c.image.width(), "h": c.image.height()},
                        "scale": t.scale,
                        "offset": t.offset,
                    }))
                })
                .collect();
            json!({
                "id": atlas.id().0,
                "width": atlas.width(),
                "height": atlas.height(),
                "layout": atlas.layout(),
                "sampler": atlas.sampler(),
                "members": members,
            })
        })
        .collect::<Vec<_>>();
    let unplaced: Vec<String> = registry
        .iter()
        .filter(|(_, c)| c.placement().is_none())
        .map(|(_, c)| c.key.to_string())
        .collect();
    json!({
        "atlases": atlases_val,
        "unplaced": unplaced,
        "stats": builder.stats(),
    })
}
