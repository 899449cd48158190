//! Single-writer service
//!
//! Reachability changes, engine notifications, visibility toggles and decoded
//! commands can originate on any task. They are queued on one channel and
//! applied in arrival order by [`StackService::run`], the only code that
//! mutates the layer collection or the network mode.

use crate::{
    command::{self, Command},
    core::{config::StackConfig, geo::LatLng},
    layers::manager::{AcceptanceResult, LayerManager},
    offline::{
        download::{DownloadManager, JobId},
        mode::{OfflineMode, PathStatus},
    },
    style::compositor::StyleDocument,
    Error, Result,
};
use tokio::sync::{mpsc, oneshot};

/// The map view the service drives
pub trait MapSink: Send {
    /// Centres the map on `coordinate`
    fn go_to(&mut self, coordinate: LatLng);

    /// Replaces the rendered style
    fn set_style(&mut self, style: &StyleDocument);
}

/// What executing a command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Moved(LatLng),
    Imported(AcceptanceResult),
    Downloading(JobId),
    CacheCleared,
    Invalid,
}

type Reply = oneshot::Sender<Result<CommandOutcome>>;

/// Messages accepted by the service queue
#[derive(Debug)]
pub enum Signal {
    Reachability(PathStatus),
    Command(Command, Option<Reply>),
    /// An encoded command message, e.g. from a deep link
    Message(String),
    Visibility { id: String, visible: bool },
    /// The download engine has queued events
    EngineEvents,
    Shutdown,
}

/// Cloneable sender side of the service queue
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<Signal>,
}

impl ServiceHandle {
    pub fn reachability(&self, status: PathStatus) -> bool {
        self.send(Signal::Reachability(status))
    }

    pub fn message(&self, message: impl Into<String>) -> bool {
        self.send(Signal::Message(message.into()))
    }

    pub fn set_visible(&self, id: impl Into<String>, visible: bool) -> bool {
        self.send(Signal::Visibility {
            id: id.into(),
            visible,
        })
    }

    pub fn engine_events(&self) -> bool {
        self.send(Signal::EngineEvents)
    }

    pub fn shutdown(&self) -> bool {
        self.send(Signal::Shutdown)
    }

    /// Queues a command and waits for its outcome
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, outcome) = oneshot::channel();
        if !self.send(Signal::Command(command, Some(reply))) {
            return Err(Error::Closed);
        }
        outcome.await.map_err(|_| Error::Closed)?
    }

    fn send(&self, signal: Signal) -> bool {
        self.tx.send(signal).is_ok()
    }
}

pub struct StackService {
    config: StackConfig,
    layers: LayerManager,
    downloads: DownloadManager,
    mode: OfflineMode,
    sink: Box<dyn MapSink>,
    rx: mpsc::UnboundedReceiver<Signal>,
    tx: mpsc::UnboundedSender<Signal>,
}

impl StackService {
    pub fn new(
        config: StackConfig,
        layers: LayerManager,
        downloads: DownloadManager,
        mode: OfflineMode,
        sink: Box<dyn MapSink>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            layers,
            downloads,
            mode,
            sink,
            rx,
            tx,
        }
    }

    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.downloads
    }

    pub fn mode(&self) -> &OfflineMode {
        &self.mode
    }

    /// Processes queued signals until a [`Signal::Shutdown`] arrives, then
    /// hands the service back
    pub async fn run(mut self) -> Self {
        self.publish_style();
        while let Some(signal) = self.rx.recv().await {
            if matches!(signal, Signal::Shutdown) {
                log::debug!("service shutting down");
                break;
            }
            self.handle_signal(signal);
            self.downloads.pump();
        }
        self
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Reachability(status) => {
                self.mode.on_reachability(status);
            }
            Signal::Command(command, reply) => {
                let outcome = self.execute(command);
                if let Err(e) = &outcome {
                    log::warn!("command failed: {}", e);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            Signal::Message(message) => {
                for command in command::decode(&message) {
                    if let Err(e) = self.execute(command) {
                        log::warn!("command failed: {}", e);
                    }
                }
            }
            Signal::Visibility { id, visible } => {
                let exclusive = self.config.mutually_exclusive;
                let result = if visible {
                    self.layers.show(&id, exclusive)
                } else {
                    self.layers.hide(&id, exclusive)
                };
                match result {
                    Ok(true) => self.publish_style(),
                    Ok(false) => log::info!("layer {} must stay visible", id),
                    Err(e) => log::warn!("visibility change for {} failed: {}", id, e),
                }
            }
            Signal::EngineEvents => {
                self.downloads.pump();
            }
            Signal::Shutdown => {}
        }
    }

    /// Executes one decoded command
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::Go(coordinate) => {
                self.sink.go_to(coordinate);
                Ok(CommandOutcome::Moved(coordinate))
            }
            Command::Import(url) => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Validation(format!("cannot import from {}", url)))?;
                let data = std::fs::read(&path)?;
                let result = self.layers.accept_json(&data)?;
                self.publish_style();
                Ok(CommandOutcome::Imported(result))
            }
            Command::Download(context) => {
                let options = self.config.compose_options();
                let job = self.downloads.start(context, &self.layers, &options)?;
                Ok(CommandOutcome::Downloading(job))
            }
            Command::ClearCache => {
                self.downloads.clear_cache()?;
                Ok(CommandOutcome::CacheCleared)
            }
            Command::Invalid => {
                log::info!("ignoring invalid command");
                Ok(CommandOutcome::Invalid)
            }
        }
    }

    fn publish_style(&mut self) {
        let style = self.layers.composite_style(&self.config.compose_options());
        self.sink.set_style(&style);
    }
}
