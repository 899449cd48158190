//! Style composition
//!
//! Folds an ordered stack of style fragments into one style document. The
//! first fragment is drawn at the bottom; its render layers come first and its
//! sources are overwritten key by key by any later fragment declaring the same
//! source id.

use crate::{
    core::{
        config::ComposeOptions,
        constants::{SOURCE_MAXZOOM, STYLE_VERSION},
    },
    layers::layer::Layer,
    style::fragment::{SourceDefinition, StyleFragment},
    Result,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete, renderable style document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub version: u8,
    pub sources: IndexMap<String, SourceDefinition>,
    pub layers: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Value>,
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self {
            version: STYLE_VERSION,
            sources: IndexMap::new(),
            layers: Vec::new(),
            sprite: None,
            glyphs: None,
            terrain: None,
        }
    }
}

impl StyleDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Ids of the render layers, in draw order
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter_map(|layer| layer.get("id").and_then(Value::as_str))
            .collect()
    }
}

/// Composes layers that are already in render order (bottom first)
pub fn compose<'a, I>(layers: I, options: &ComposeOptions) -> StyleDocument
where
    I: IntoIterator<Item = &'a Layer>,
{
    compose_fragments(layers.into_iter().map(|layer| &layer.style), options)
}

/// Composes raw style fragments that are already in render order (bottom first)
pub fn compose_fragments<'a, I>(fragments: I, options: &ComposeOptions) -> StyleDocument
where
    I: IntoIterator<Item = &'a StyleFragment>,
{
    let mut document = StyleDocument::default();

    for fragment in fragments {
        for (id, definition) in &fragment.sources {
            let target = document.sources.entry(id.clone()).or_default();
            merge_source_definition(target, definition, options.max_tile_zoom);
        }

        document.layers.extend(fragment.layers.iter().cloned());

        // First non-empty value wins
        if document.sprite.is_none() {
            document.sprite = fragment.sprite().map(str::to_string);
        }
        if document.glyphs.is_none() {
            document.glyphs = fragment.glyphs().map(str::to_string);
        }
        if document.terrain.is_none() {
            document.terrain = fragment.terrain().cloned();
        }
    }

    document
}

/// Merges `incoming` into `target` key by key.
///
/// Every key of `incoming` overwrites the one in `target`, except `maxzoom`
/// which is capped at `max_tile_zoom` when a cap is given. Keys only present in
/// `target` are kept.
pub fn merge_source_definition(
    target: &mut SourceDefinition,
    incoming: &SourceDefinition,
    max_tile_zoom: Option<u8>,
) {
    for (key, value) in incoming {
        let merged = match max_tile_zoom {
            Some(cap) if key == SOURCE_MAXZOOM => cap_zoom(value, cap),
            _ => value.clone(),
        };
        target.insert(key.clone(), merged);
    }
}

fn cap_zoom(value: &Value, cap: u8) -> Value {
    if let Some(zoom) = value.as_u64() {
        Value::from(zoom.min(u64::from(cap)))
    } else if let Some(zoom) = value.as_f64() {
        Value::from(zoom.min(f64::from(cap)))
    } else {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn source(value: Value) -> SourceDefinition {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_merge_overwrites_per_key() {
        let mut target = source(json!({"type": "vector", "url": "a", "attribution": "x"}));
        merge_source_definition(&mut target, &source(json!({"url": "b"})), None);
        assert_eq!(
            Value::Object(target),
            json!({"type": "vector", "url": "b", "attribution": "x"})
        );
    }

    #[test]
    fn test_merge_caps_maxzoom() {
        let mut target = SourceDefinition::new();
        merge_source_definition(
            &mut target,
            &source(json!({"maxzoom": 18, "minzoom": 20})),
            Some(14),
        );
        assert_eq!(target["maxzoom"], json!(14));
        // only maxzoom is capped
        assert_eq!(target["minzoom"], json!(20));

        merge_source_definition(&mut target, &source(json!({"maxzoom": 10})), Some(14));
        assert_eq!(target["maxzoom"], json!(10));

        merge_source_definition(&mut target, &source(json!({"maxzoom": 15.5})), Some(14));
        assert_eq!(target["maxzoom"], json!(14.0));
    }

    #[test]
    fn test_merge_without_cap_keeps_maxzoom() {
        let mut target = SourceDefinition::new();
        merge_source_definition(&mut target, &source(json!({"maxzoom": 18})), None);
        assert_eq!(target["maxzoom"], json!(18));
    }

    #[test]
    fn test_first_sprite_glyphs_terrain_win() {
        let bottom = StyleFragment::new()
            .with_sprite("sprite://bottom")
            .with_terrain(json!({"source": "dem"}));
        let middle = StyleFragment::new().with_glyphs("").with_sprite("sprite://middle");
        let top = StyleFragment::new()
            .with_glyphs("glyphs://top")
            .with_terrain(json!({"source": "other"}));

        let document = compose_fragments([&bottom, &middle, &top], &ComposeOptions::default());
        assert_eq!(document.sprite.as_deref(), Some("sprite://bottom"));
        assert_eq!(document.glyphs.as_deref(), Some("glyphs://top"));
        assert_eq!(document.terrain, Some(json!({"source": "dem"})));
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let fragment = StyleFragment::new()
            .with_source("osm", json!({"type": "raster", "tiles": ["t"]}))
            .with_layer(json!({"id": "osm", "type": "raster", "source": "osm"}));
        let json = compose_fragments([&fragment], &ComposeOptions::default())
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"version":8,"sources":{"osm":{"type":"raster","tiles":["t"]}},"layers":[{"id":"osm","type":"raster","source":"osm"}]}"#
        );
    }

    #[test]
    fn test_render_layers_concatenate_in_order() {
        let a = StyleFragment::new()
            .with_layer(json!({"id": "a1"}))
            .with_layer(json!({"id": "a2"}));
        let b = StyleFragment::new().with_layer(json!({"id": "b1"}));

        let ab = compose_fragments([&a, &b], &ComposeOptions::default());
        let ba = compose_fragments([&b, &a], &ComposeOptions::default());
        assert_eq!(ab.layer_ids(), vec!["a1", "a2", "b1"]);
        assert_eq!(ba.layer_ids(), vec!["b1", "a1", "a2"]);
        assert_eq!(ab.sources, ba.sources);
    }

    #[test]
    fn test_composition_is_deterministic() {
        let a = StyleFragment::new()
            .with_source("s2", json!({"type": "vector", "maxzoom": 16}))
            .with_source("s1", json!({"type": "raster"}))
            .with_layer(json!({"id": "a", "paint": {"z": 1, "a": 2}}));
        let first = compose_fragments([&a], &ComposeOptions::with_max_tile_zoom(12));
        let second = compose_fragments([&a], &ComposeOptions::with_max_tile_zoom(12));
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        assert_eq!(
            first.sources.keys().collect::<Vec<_>>(),
            vec!["s2", "s1"]
        );
    }
}
