//! The layer model, the group registry and the layer manager

pub mod group;
pub mod layer;
pub mod manager;
pub mod store;

pub use group::{Group, GroupId, GROUPS};
pub use layer::{Layer, LayerDefinition, LayerMetadata, UiMode, UserSettings};
pub use manager::{compare_layers, AcceptOutcome, AcceptanceResult, LayerEvent, LayerManager};
pub use store::{JsonFileStore, LayerStore, MemoryStore};
