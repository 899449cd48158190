use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single source definition: arbitrary keys such as `type`, `url`, `tiles`, `maxzoom`
pub type SourceDefinition = serde_json::Map<String, Value>;

/// The style payload carried by a layer.
///
/// Sources keep their insertion order so that composing the same fragments
/// always yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleFragment {
    #[serde(default)]
    pub sources: IndexMap<String, SourceDefinition>,
    #[serde(default)]
    pub layers: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Value>,
}

impl StyleFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source; definitions that are not JSON objects are skipped
    pub fn with_source(mut self, id: impl Into<String>, definition: Value) -> Self {
        let id = id.into();
        match definition {
            Value::Object(map) => {
                self.sources.insert(id, map);
            }
            other => log::warn!("skipping source {}: definition is not an object ({})", id, other),
        }
        self
    }

    pub fn with_layer(mut self, layer: Value) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn with_glyphs(mut self, glyphs: impl Into<String>) -> Self {
        self.glyphs = Some(glyphs.into());
        self
    }

    pub fn with_terrain(mut self, terrain: Value) -> Self {
        self.terrain = Some(terrain);
        self
    }

    /// Sprite URL, if set to something other than an empty string
    pub fn sprite(&self) -> Option<&str> {
        self.sprite.as_deref().filter(|s| !s.is_empty())
    }

    /// Glyph URL template, if set to something other than an empty string
    pub fn glyphs(&self) -> Option<&str> {
        self.glyphs.as_deref().filter(|s| !s.is_empty())
    }

    /// Terrain configuration, ignoring `null` and empty objects
    pub fn terrain(&self) -> Option<&Value> {
        self.terrain.as_ref().filter(|t| match t {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fragment_defaults_when_fields_missing() {
        let fragment: StyleFragment = serde_json::from_value(json!({})).unwrap();
        assert!(fragment.sources.is_empty());
        assert!(fragment.layers.is_empty());
        assert_eq!(fragment.sprite(), None);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let fragment = StyleFragment::new()
            .with_sprite("")
            .with_glyphs("https://example.com/{fontstack}/{range}.pbf")
            .with_terrain(json!({}));

        assert_eq!(fragment.sprite(), None);
        assert!(fragment.glyphs().is_some());
        assert_eq!(fragment.terrain(), None);
    }

    #[test]
    fn test_sources_keep_declaration_order() {
        let fragment: StyleFragment = serde_json::from_str(
            r#"{"sources": {"zeta": {"type": "vector"}, "alpha": {"type": "raster"}}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = fragment.sources.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_non_object_source_is_skipped() {
        let fragment = StyleFragment::new()
            .with_source("broken", json!("https://example.com/tiles.json"))
            .with_source("ok", json!({"type": "vector"}));
        let ids: Vec<&str> = fragment.sources.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["ok"]);
    }
}
