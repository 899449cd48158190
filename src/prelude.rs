//! Prelude module for common mapstack types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapstack::prelude::*;`

pub use crate::core::{
    config::{ComposeOptions, StackConfig},
    geo::{LatLng, LatLngBounds},
};

pub use crate::layers::{
    group::{Group, GroupId, GROUPS},
    layer::{Layer, LayerDefinition, UiMode},
    manager::{compare_layers, AcceptOutcome, AcceptanceResult, LayerEvent, LayerManager},
    store::{JsonFileStore, LayerStore, MemoryStore},
};

pub use crate::style::{
    compositor::{compose, StyleDocument},
    fragment::{SourceDefinition, StyleFragment},
};

pub use crate::offline::{
    context::{PackContext, ZoomRange},
    download::{
        event_channel, DownloadManager, EngineEvent, EngineEventKind, JobEvent, JobId, JobState,
        OfflineEngine, RegionRequest,
    },
    mode::{NetworkMode, OfflineMode, PathStatus},
};

pub use crate::command::{decode, decode_url, encode, Command};

#[cfg(feature = "tokio-runtime")]
pub use crate::service::{CommandOutcome, MapSink, ServiceHandle, StackService};

pub use crate::{Error as StackError, Result};
