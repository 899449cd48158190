//! Download jobs
//!
//! The download engine is an external collaborator: it accepts region
//! requests, keeps the encoded [`PackContext`] next to each job and pushes
//! progress back over a channel. Every subscription to a job carries a token;
//! events tagged with a superseded token are dropped, so nothing from before a
//! redownload or delete is ever observed.

use crate::{
    core::{config::ComposeOptions, geo::LatLngBounds},
    layers::manager::{LayerManager, ListenerId},
    offline::context::{PackContext, ZoomRange},
    style::compositor::StyleDocument,
    Error, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use fxhash::FxHashMap;

/// Engine-assigned job identifier
pub type JobId = u64;

/// Identifies one progress subscription of one job
pub type SubscriptionToken = u64;

type Listener = Box<dyn FnMut(&JobEvent) + Send>;

/// What the engine is asked to download
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRequest {
    pub style: StyleDocument,
    pub bounds: LatLngBounds,
    pub zoom: ZoomRange,
    /// Encoded [`PackContext`], stored by the engine and returned unmodified
    pub context: Vec<u8>,
}

/// The offline tile engine
pub trait OfflineEngine: Send {
    /// Registers a region and starts downloading it
    fn add_pack(&mut self, request: RegionRequest, token: SubscriptionToken) -> Result<JobId>;

    /// Discards downloaded tiles so the next fetch starts fresh
    fn invalidate(&mut self, job: JobId, token: SubscriptionToken) -> Result<()>;

    /// Deletes the job and everything stored with it
    fn remove(&mut self, job: JobId) -> Result<()>;

    /// Asks for a progress event for `job`
    fn request_progress(&mut self, job: JobId, token: SubscriptionToken) -> Result<()>;

    /// Drops every cached tile not owned by a pack
    fn clear_cache(&mut self) -> Result<()>;
}

/// Event pushed by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub job: JobId,
    pub token: SubscriptionToken,
    pub kind: EngineEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    Progress { completed: u64, expected: u64 },
    Completed,
    Failed(String),
}

/// Creates the channel an engine reports on
pub fn event_channel() -> (Sender<EngineEvent>, Receiver<EngineEvent>) {
    unbounded()
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Requested,
    Active { completed: u64, expected: u64 },
    Completed,
    Invalidated,
    Failed(String),
    Deleted,
}

impl JobState {
    /// Fraction downloaded, when known
    pub fn progress(&self) -> Option<f64> {
        match self {
            JobState::Active { completed, expected } if *expected > 0 => {
                Some(*completed as f64 / *expected as f64)
            }
            JobState::Completed => Some(1.0),
            _ => None,
        }
    }
}

/// Notification sent to listeners whenever a job changes state
#[derive(Debug, Clone, PartialEq)]
pub struct JobEvent {
    pub job: JobId,
    pub state: JobState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub id: JobId,
    pub context: PackContext,
    pub state: JobState,
    token: SubscriptionToken,
}

/// Tracks every download job and applies engine events to them
pub struct DownloadManager {
    engine: Box<dyn OfflineEngine>,
    events: Receiver<EngineEvent>,
    jobs: FxHashMap<JobId, DownloadJob>,
    next_token: SubscriptionToken,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl DownloadManager {
    pub fn new(engine: Box<dyn OfflineEngine>, events: Receiver<EngineEvent>) -> Self {
        Self {
            engine,
            events,
            jobs: FxHashMap::default(),
            next_token: 1,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&JobEvent) + Send + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn job(&self, id: JobId) -> Option<&DownloadJob> {
        self.jobs.get(&id)
    }

    /// All known jobs ordered by id
    pub fn jobs(&self) -> Vec<&DownloadJob> {
        let mut jobs: Vec<&DownloadJob> = self.jobs.values().collect();
        jobs.sort_by_key(|job| job.id);
        jobs
    }

    /// Re-attaches jobs the engine already holds, decoding their stored contexts.
    ///
    /// Jobs whose context cannot be decoded are skipped. Returns how many were adopted.
    pub fn restore<I>(&mut self, packs: I) -> usize
    where
        I: IntoIterator<Item = (JobId, Vec<u8>)>,
    {
        let mut adopted = 0;
        for (id, data) in packs {
            let Some(context) = PackContext::decode_opt(&data) else {
                log::warn!("skipping job {} with undecodable context", id);
                continue;
            };
            let token = self.issue_token();
            self.jobs.insert(
                id,
                DownloadJob {
                    id,
                    context,
                    state: JobState::Requested,
                    token,
                },
            );
            adopted += 1;
        }
        adopted
    }

    /// Resolves `context` against the live layers and submits it to the engine
    pub fn start(
        &mut self,
        context: PackContext,
        layers: &LayerManager,
        options: &ComposeOptions,
    ) -> Result<JobId> {
        context.validate()?;
        let request = RegionRequest {
            style: context.resolve_fixed_style(layers, options)?,
            bounds: context.bounds,
            zoom: context.zoom,
            context: context.encode()?,
        };
        let token = self.issue_token();
        let id = self.engine.add_pack(request, token)?;
        log::info!("started download '{}' as job {}", context.name, id);

        self.jobs.insert(
            id,
            DownloadJob {
                id,
                context,
                state: JobState::Requested,
                token,
            },
        );
        self.notify(id, JobState::Requested);
        Ok(id)
    }

    /// Forces a fresh fetch of an existing job, keeping its context
    pub fn redownload(&mut self, id: JobId) -> Result<()> {
        if !self.jobs.contains_key(&id) {
            return Err(Error::Validation(format!("unknown download job {}", id)));
        }
        let token = self.issue_token();
        self.engine.invalidate(id, token)?;
        if let Some(job) = self.jobs.get_mut(&id) {
            job.token = token;
            job.state = JobState::Invalidated;
        }
        log::info!("redownloading job {}", id);
        self.notify(id, JobState::Invalidated);
        Ok(())
    }

    /// Removes a job and its context permanently
    pub fn delete(&mut self, id: JobId) -> Result<DownloadJob> {
        if !self.jobs.contains_key(&id) {
            return Err(Error::Validation(format!("unknown download job {}", id)));
        }
        self.engine.remove(id)?;
        let mut job = self
            .jobs
            .remove(&id)
            .ok_or_else(|| Error::Validation(format!("unknown download job {}", id)))?;
        job.state = JobState::Deleted;
        log::info!("deleted job {}", id);
        self.notify(id, JobState::Deleted);
        Ok(job)
    }

    /// Requests a progress snapshot for every known job
    pub fn refresh(&mut self) -> Result<()> {
        for job in self.jobs.values() {
            self.engine.request_progress(job.id, job.token)?;
        }
        Ok(())
    }

    pub fn clear_cache(&mut self) -> Result<()> {
        log::info!("clearing tile cache");
        self.engine.clear_cache()
    }

    /// Applies every pending engine event; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let pending: Vec<EngineEvent> = self.events.try_iter().collect();
        pending
            .into_iter()
            .filter(|event| self.apply(event))
            .count()
    }

    /// Applies one event, ignoring it if it belongs to an unknown job or a
    /// superseded subscription
    pub fn apply(&mut self, event: &EngineEvent) -> bool {
        let Some(job) = self.jobs.get_mut(&event.job) else {
            log::debug!("dropping event for unknown job {}", event.job);
            return false;
        };
        if job.token != event.token {
            log::debug!(
                "dropping stale event for job {} (token {} != {})",
                event.job,
                event.token,
                job.token
            );
            return false;
        }

        job.state = match &event.kind {
            EngineEventKind::Progress {
                completed,
                expected,
            } if *expected > 0 && completed >= expected => JobState::Completed,
            EngineEventKind::Progress {
                completed,
                expected,
            } => JobState::Active {
                completed: *completed,
                expected: *expected,
            },
            EngineEventKind::Completed => JobState::Completed,
            EngineEventKind::Failed(message) => {
                log::warn!("job {} failed: {}", event.job, message);
                JobState::Failed(message.clone())
            }
        };
        let state = job.state.clone();
        self.notify(event.job, state);
        true
    }

    fn issue_token(&mut self) -> SubscriptionToken {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    fn notify(&mut self, job: JobId, state: JobState) {
        let event = JobEvent { job, state };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}
