//! # Mapstack
//!
//! Stacks self-contained map style fragments ("layers") into one renderable
//! style document, packages layer selections and regions into offline pack
//! descriptors, and decodes the command strings used by deep links and share
//! imports.

pub mod command;
pub mod core;
pub mod layers;
pub mod offline;
pub mod prelude;
#[cfg(feature = "tokio-runtime")]
pub mod service;
pub mod style;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{ComposeOptions, StackConfig},
    geo::{LatLng, LatLngBounds},
};

pub use layers::{
    group::GroupId,
    layer::{Layer, LayerDefinition},
    manager::LayerManager,
};

pub use style::{compositor::StyleDocument, fragment::StyleFragment};

pub use offline::{context::PackContext, download::DownloadManager, mode::OfflineMode};

pub use command::Command;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, StackError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed wire data
    #[error("Decode error: {0}")]
    Decode(String),

    /// Well-formed data that makes no sense, such as an unknown layer id
    #[error("Validation error: {0}")]
    Validation(String),

    /// An id already exists where overwriting is not allowed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failure reported by the download engine
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Service stopped")]
    Closed,
}

/// Error type alias for convenience
pub type Error = StackError;
