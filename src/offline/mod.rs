//! Offline packs: region descriptors, download jobs and the online/offline switch

pub mod context;
pub mod download;
pub mod mode;

pub use context::{PackContext, ZoomRange};
pub use download::{
    event_channel, DownloadManager, EngineEvent, EngineEventKind, JobEvent, JobId, JobState,
    OfflineEngine, RegionRequest,
};
pub use mode::{NetworkMode, OfflineMode, PathStatus};
