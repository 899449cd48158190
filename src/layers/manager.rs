use crate::{
    core::config::ComposeOptions,
    layers::{
        layer::{Layer, LayerDefinition},
        store::LayerStore,
    },
    style::compositor::{compose, StyleDocument},
    Error, Result,
};
use std::cmp::Ordering;

/// Handle returned by [`LayerManager::subscribe`]
pub type ListenerId = usize;

type Listener = Box<dyn FnMut(&LayerEvent) + Send>;

/// Whether an import created a new layer or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Added,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceResult {
    pub id: String,
    pub outcome: AcceptOutcome,
}

/// Notifications sent to listeners after a mutation has been persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEvent {
    /// Visibility or flags changed
    Changed,
    Accepted(AcceptanceResult),
    Removed(String),
}

/// Total render order for layers.
///
/// Opaque layers come first, then group precedence, then enabled before
/// disabled, then `group_index`, then name. Ids break any remaining tie so
/// that two distinct layers never compare equal.
pub fn compare_layers(a: &Layer, b: &Layer) -> Ordering {
    b.is_opaque()
        .cmp(&a.is_opaque())
        .then_with(|| a.group.priority().cmp(&b.group.priority()))
        .then_with(|| b.enabled.cmp(&a.enabled))
        .then_with(|| a.group_index.cmp(&b.group_index))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Owns the layer collection and is its only writer
pub struct LayerManager {
    layers: Vec<Layer>,
    store: Box<dyn LayerStore>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl LayerManager {
    /// Creates a manager over `store` without reading from it
    pub fn new(store: Box<dyn LayerStore>) -> Self {
        Self {
            layers: Vec::new(),
            store,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Creates a manager and loads the stored collection
    pub fn load(store: Box<dyn LayerStore>) -> Result<Self> {
        let stored = store.read()?;
        let mut layers: Vec<Layer> = Vec::with_capacity(stored.len());
        for layer in stored {
            if layers.iter().any(|kept| kept.id == layer.id) {
                log::warn!("ignoring duplicate stored layer {}", layer.id);
                continue;
            }
            layers.push(layer);
        }
        log::info!("loaded {} layers", layers.len());
        let mut manager = Self::new(store);
        manager.layers = layers;
        Ok(manager)
    }

    /// Populates an empty collection with first-run layers.
    ///
    /// Returns how many layers were added; a non-empty collection is left alone.
    pub fn seed<I>(&mut self, definitions: I) -> Result<usize>
    where
        I: IntoIterator<Item = LayerDefinition>,
    {
        if !self.layers.is_empty() {
            return Ok(0);
        }
        let mut seeded: Vec<Layer> = Vec::new();
        for definition in definitions {
            if seeded.iter().any(|layer| layer.id == definition.metadata.id) {
                log::warn!("skipping duplicate seed layer {}", definition.metadata.id);
                continue;
            }
            seeded.push(Layer::from_definition(definition));
        }
        let count = seeded.len();
        if count > 0 {
            log::info!("seeded {} layers", count);
            self.commit(seeded, LayerEvent::Changed)?;
        }
        Ok(count)
    }

    /// Registers a listener notified after every persisted mutation
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LayerEvent) + Send + 'static,
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

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// All layers in stored order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// All layers in render order
    pub fn sorted_layers(&self) -> Vec<&Layer> {
        let mut sorted: Vec<&Layer> = self.layers.iter().collect();
        sorted.sort_by(|a, b| compare_layers(a, b));
        sorted
    }

    /// Visible layers in render order
    pub fn visible_layers(&self) -> Vec<&Layer> {
        let mut visible: Vec<&Layer> = self.layers.iter().filter(|l| l.visible).collect();
        visible.sort_by(|a, b| compare_layers(a, b));
        visible
    }

    /// Pinned layers in render order
    pub fn pinned_layers(&self) -> Vec<&Layer> {
        let mut pinned: Vec<&Layer> = self.layers.iter().filter(|l| l.pinned).collect();
        pinned.sort_by(|a, b| compare_layers(a, b));
        pinned
    }

    /// Resolves ids to live layers, sorted into render order
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<&Layer>> {
        let mut resolved = ids
            .iter()
            .map(|id| {
                self.layer(id)
                    .ok_or_else(|| Error::Validation(format!("unknown layer id '{}'", id)))
            })
            .collect::<Result<Vec<_>>>()?;
        resolved.sort_by(|a, b| compare_layers(a, b));
        Ok(resolved)
    }

    /// The composite style of every visible layer
    pub fn composite_style(&self, options: &ComposeOptions) -> StyleDocument {
        compose(self.visible_layers(), options)
    }

    /// Distinct non-empty attributions of the visible layers, bottom first
    pub fn attribution(&self) -> Vec<&str> {
        let mut attributions: Vec<&str> = Vec::new();
        for layer in self.visible_layers() {
            let text = layer.attribution.as_str();
            if !text.is_empty() && !attributions.contains(&text) {
                attributions.push(text);
            }
        }
        attributions
    }

    /// Whether the top-most visible layer asks for a dark interface
    pub fn needs_dark_ui(&self) -> bool {
        self.visible_layers()
            .last()
            .map(|layer| layer.needs_dark_ui())
            .unwrap_or(false)
    }

    /// Makes a layer visible.
    ///
    /// With `mutually_exclusive`, showing an opaque layer hides every other
    /// opaque layer; non-opaque layers are never touched.
    pub fn show(&mut self, id: &str, mutually_exclusive: bool) -> Result<bool> {
        let index = self.require(id)?;
        let exclusive = mutually_exclusive && self.layers[index].is_opaque();

        let mut next = self.layers.clone();
        for (i, layer) in next.iter_mut().enumerate() {
            if i == index {
                layer.visible = true;
            } else if exclusive && layer.is_opaque() {
                layer.visible = false;
            }
        }
        log::debug!("showing layer {} (exclusive: {})", id, exclusive);
        self.commit(next, LayerEvent::Changed)?;
        Ok(true)
    }

    /// Hides a layer.
    ///
    /// Returns `false` without changing anything when `mutually_exclusive` is
    /// set and hiding this opaque layer would leave no opaque layer visible.
    pub fn hide(&mut self, id: &str, mutually_exclusive: bool) -> Result<bool> {
        let index = self.require(id)?;
        if mutually_exclusive && self.layers[index].is_opaque() {
            let visible_opaque = self
                .layers
                .iter()
                .filter(|layer| layer.visible && layer.is_opaque())
                .count();
            if visible_opaque < 2 {
                log::debug!("refusing to hide {}: last visible opaque layer", id);
                return Ok(false);
            }
        }

        let mut next = self.layers.clone();
        next[index].visible = false;
        log::debug!("hiding layer {}", id);
        self.commit(next, LayerEvent::Changed)?;
        Ok(true)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        let index = self.require(id)?;
        let mut next = self.layers.clone();
        next[index].enabled = enabled;
        self.commit(next, LayerEvent::Changed)
    }

    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<()> {
        let index = self.require(id)?;
        let mut next = self.layers.clone();
        next[index].pinned = pinned;
        self.commit(next, LayerEvent::Changed)
    }

    /// Adds a new layer or updates the existing layer with the same id
    pub fn accept(&mut self, definition: LayerDefinition) -> Result<AcceptanceResult> {
        let id = definition.metadata.id.clone();
        let mut next = self.layers.clone();
        let outcome = match self.index_of(&id) {
            Some(index) => {
                next[index].update(definition);
                AcceptOutcome::Updated
            }
            None => {
                next.push(Layer::from_definition(definition));
                AcceptOutcome::Added
            }
        };

        let result = AcceptanceResult { id, outcome };
        self.commit(next, LayerEvent::Accepted(result.clone()))?;
        log::info!("accepted layer {}: {:?}", result.id, result.outcome);
        Ok(result)
    }

    /// Decodes a JSON layer definition and accepts it
    pub fn accept_json(&mut self, data: &[u8]) -> Result<AcceptanceResult> {
        let definition = LayerDefinition::from_json(data)?;
        self.accept(definition)
    }

    /// Deletes a layer permanently
    pub fn remove(&mut self, id: &str) -> Result<Option<Layer>> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        let mut next = self.layers.clone();
        let removed = next.remove(index);
        self.commit(next, LayerEvent::Removed(removed.id.clone()))?;
        log::info!("removed layer {}", id);
        Ok(Some(removed))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| Error::Validation(format!("unknown layer id '{}'", id)))
    }

    /// Writes `next` to the store and adopts it only once the write succeeded
    fn commit(&mut self, next: Vec<Layer>, event: LayerEvent) -> Result<()> {
        if let Err(err) = self.store.write(&next) {
            log::warn!("layer store write failed, keeping previous collection: {}", err);
            return Err(err);
        }
        self.layers = next;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
        Ok(())
    }
}
