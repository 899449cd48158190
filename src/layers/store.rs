//! Persistence boundary for the layer collection
//!
//! Stores read and write the whole collection at once; there are no partial
//! updates.

use crate::{layers::layer::Layer, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Backing store for the layer collection
pub trait LayerStore: Send {
    /// Returns every stored layer in stored order, or an empty list
    fn read(&self) -> Result<Vec<Layer>>;

    /// Replaces the stored collection
    fn write(&mut self, layers: &[Layer]) -> Result<()>;
}

/// In-memory store, shareable so tests can inspect what was written
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layers: Arc<Mutex<Vec<Layer>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers(layers: Vec<Layer>) -> Self {
        Self {
            layers: Arc::new(Mutex::new(layers)),
            writes: Arc::default(),
        }
    }

    /// Number of writes performed so far
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<Layer> {
        self.layers.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LayerStore for MemoryStore {
    fn read(&self) -> Result<Vec<Layer>> {
        Ok(self.snapshot())
    }

    fn write(&mut self, layers: &[Layer]) -> Result<()> {
        if let Ok(mut stored) = self.layers.lock() {
            *stored = layers.to_vec();
        }
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}

/// Stores the collection as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayerStore for JsonFileStore {
    fn read(&self) -> Result<Vec<Layer>> {
        match std::fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, layers: &[Layer]) -> Result<()> {
        let data = serde_json::to_vec_pretty(layers)?;
        // Replace atomically
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("wrote {} layers to {}", layers.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::group::GroupId;

    #[test]
    fn test_file_store_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("layers.json"));
        assert!(store.read().unwrap().is_empty());

        let layers = vec![
            Layer::new("zeta", "Zeta", GroupId::Gpx),
            Layer::new("alpha", "Alpha", GroupId::Base).with_visible(true),
        ];
        store.write(&layers).unwrap();
        assert_eq!(store.read().unwrap(), layers);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layers.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonFileStore::new(path).read().is_err());
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        let handle = store.clone();
        store.write(&[Layer::new("a", "A", GroupId::Base)]).unwrap();
        assert_eq!(handle.write_count(), 1);
        assert_eq!(handle.snapshot().len(), 1);
    }
}
