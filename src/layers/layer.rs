use crate::{layers::group::GroupId, style::fragment::StyleFragment, Result};
use serde::{Deserialize, Serialize};

/// Interface appearance forced by a layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Derive from the layer's group
    #[default]
    None,
    Light,
    Dark,
}

/// One independently toggleable map layer with its own style fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub group: GroupId,
    /// Tiebreak order among layers of the same group
    pub group_index: i64,
    #[serde(default)]
    pub attribution: String,
    #[serde(default, rename = "overrideUIMode")]
    pub override_ui_mode: UiMode,
    pub visible: bool,
    pub enabled: bool,
    #[serde(default)]
    pub pinned: bool,
    pub style: StyleFragment,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, group: GroupId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group,
            group_index: 0,
            attribution: String::new(),
            override_ui_mode: UiMode::None,
            visible: false,
            enabled: true,
            pinned: false,
            style: StyleFragment::default(),
        }
    }

    pub fn with_group_index(mut self, group_index: i64) -> Self {
        self.group_index = group_index;
        self
    }

    pub fn with_style(mut self, style: StyleFragment) -> Self {
        self.style = style;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builds a fresh, hidden layer from an imported definition
    pub fn from_definition(definition: LayerDefinition) -> Self {
        let user = definition.user.unwrap_or_default();
        let metadata = definition.metadata;
        Self {
            id: metadata.id,
            name: metadata.name,
            group: metadata.group,
            group_index: user.group_index,
            attribution: metadata.attribution,
            override_ui_mode: metadata.override_ui_mode,
            visible: false,
            enabled: user.enabled,
            pinned: user.pinned,
            style: definition.style,
        }
    }

    /// Overwrites the definition-owned fields, keeping id and user state.
    ///
    /// `group_index` is only replaced when the definition carries user settings.
    pub fn update(&mut self, definition: LayerDefinition) {
        let metadata = definition.metadata;
        self.name = metadata.name;
        self.group = metadata.group;
        self.attribution = metadata.attribution;
        self.override_ui_mode = metadata.override_ui_mode;
        if let Some(user) = definition.user {
            self.group_index = user.group_index;
        }
        self.style = definition.style;
    }

    pub fn is_opaque(&self) -> bool {
        self.group.is_opaque()
    }

    pub fn needs_dark_ui(&self) -> bool {
        match self.override_ui_mode {
            UiMode::Light => false,
            UiMode::Dark => true,
            UiMode::None => self.group.prefers_dark_ui(),
        }
    }
}

/// Import format for a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub metadata: LayerMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSettings>,
    pub style: StyleFragment,
}

impl LayerDefinition {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| crate::Error::Decode(format!("layer definition: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub id: String,
    pub name: String,
    pub group: GroupId,
    #[serde(default, rename = "overrideUIMode")]
    pub override_ui_mode: UiMode,
    #[serde(default)]
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub group_index: i64,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            group_index: 0,
            pinned: false,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(value: serde_json::Value) -> LayerDefinition {
        LayerDefinition::from_json(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_from_definition() {
        let layer = Layer::from_definition(definition(json!({
            "metadata": {"id": "os", "name": "Ordnance Survey", "group": "base", "attribution": "© OS"},
            "user": {"groupIndex": 3, "pinned": true},
            "style": {"layers": [{"id": "os-raster"}]}
        })));

        assert_eq!(layer.id, "os");
        assert_eq!(layer.group, GroupId::Base);
        assert_eq!(layer.group_index, 3);
        assert!(layer.pinned);
        assert!(layer.enabled);
        assert!(!layer.visible);
        assert_eq!(layer.style.layers.len(), 1);
    }

    #[test]
    fn test_update_preserves_identity_and_user_state() {
        let mut layer = Layer::new("os", "Old", GroupId::Base)
            .with_group_index(2)
            .with_visible(true)
            .with_enabled(false);

        layer.update(definition(json!({
            "metadata": {"id": "os", "name": "New", "group": "historic", "overrideUIMode": "dark"},
            "style": {"sprite": "sprite://new"}
        })));

        assert_eq!(layer.id, "os");
        assert_eq!(layer.name, "New");
        assert_eq!(layer.group, GroupId::Historic);
        assert_eq!(layer.group_index, 2);
        assert!(layer.visible);
        assert!(!layer.enabled);
        assert_eq!(layer.style.sprite(), Some("sprite://new"));
        assert!(layer.needs_dark_ui());
    }

    #[test]
    fn test_needs_dark_ui() {
        assert!(Layer::new("a", "A", GroupId::Aerial).needs_dark_ui());
        assert!(Layer::new("o", "O", GroupId::Overlay).needs_dark_ui());
        assert!(!Layer::new("b", "B", GroupId::Base).needs_dark_ui());

        let mut aerial = Layer::new("a", "A", GroupId::Aerial);
        aerial.override_ui_mode = UiMode::Light;
        assert!(!aerial.needs_dark_ui());
    }

    #[test]
    fn test_malformed_definition_is_decode_error() {
        let err = LayerDefinition::from_json(br#"{"metadata": {"id": "x"}}"#).unwrap_err();
        assert!(matches!(err, crate::StackError::Decode(_)));

        let err = LayerDefinition::from_json(
            br#"{"metadata": {"id": "x", "name": "X", "group": "nope"}, "style": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::StackError::Decode(_)));
    }
}
