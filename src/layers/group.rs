use serde::{Deserialize, Serialize};

/// The groups a layer can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    Base,
    Aerial,
    Historic,
    Overlay,
    Gpx,
}

impl GroupId {
    /// Position in [`GROUPS`]; lower draws first
    pub fn priority(self) -> usize {
        GROUPS
            .iter()
            .position(|group| group.id == self)
            .unwrap_or(GROUPS.len())
    }

    /// Opaque groups fully cover whatever is drawn beneath them
    pub fn is_opaque(self) -> bool {
        !matches!(self, GroupId::Gpx | GroupId::Overlay)
    }

    /// Groups whose imagery reads better with a dark interface on top
    pub fn prefers_dark_ui(self) -> bool {
        matches!(self, GroupId::Aerial | GroupId::Overlay)
    }

    pub fn group(self) -> &'static Group {
        &GROUPS[self.priority()]
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupId::Base => write!(f, "base"),
            GroupId::Aerial => write!(f, "aerial"),
            GroupId::Historic => write!(f, "historic"),
            GroupId::Overlay => write!(f, "overlay"),
            GroupId::Gpx => write!(f, "gpx"),
        }
    }
}

/// Display metadata for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: &'static str,
    /// Hex RGB colour used for the group badge
    pub colour: &'static str,
    pub icon: &'static str,
}

/// Every known group, in precedence order
pub const GROUPS: [Group; 5] = [
    Group {
        id: GroupId::Base,
        name: "Base Maps",
        colour: "#4c8bf5",
        icon: "map",
    },
    Group {
        id: GroupId::Aerial,
        name: "Aerial Imagery",
        colour: "#2e9e5b",
        icon: "airplane",
    },
    Group {
        id: GroupId::Historic,
        name: "Historic Maps",
        colour: "#b5802f",
        icon: "clock",
    },
    Group {
        id: GroupId::Overlay,
        name: "Overlays",
        colour: "#8e44ad",
        icon: "square.stack",
    },
    Group {
        id: GroupId::Gpx,
        name: "GPX Tracks",
        colour: "#e74c3c",
        icon: "point.topleft.down.curvedto.point.bottomright.up",
    },
];
