//! Offline pack context
//!
//! A pack context names the layers, bounds and zoom window of a downloadable
//! region. It is stored as an opaque JSON blob by the download engine and read
//! back whenever a job is inspected, redownloaded or deleted.

use crate::{
    core::{
        config::ComposeOptions,
        constants::{SOURCE_MAXZOOM, SOURCE_MINZOOM},
        geo::LatLngBounds,
    },
    layers::{layer::Layer, manager::LayerManager},
    style::compositor::{compose, StyleDocument},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive zoom window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub from: f64,
    pub to: f64,
}

impl ZoomRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn is_valid(&self) -> bool {
        self.from.is_finite() && self.to.is_finite() && self.from >= 0.0 && self.from <= self.to
    }
}

/// Descriptor of a downloadable region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackContext {
    /// Ids of the selected layers, without duplicates, in render order
    pub layers: Vec<String>,
    pub bounds: LatLngBounds,
    pub name: String,
    pub zoom: ZoomRange,
}

impl PackContext {
    /// Captures the ids of `layers` together with the region envelope
    pub fn build<'a, I>(layers: I, bounds: LatLngBounds, zoom: ZoomRange, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = &'a Layer>,
    {
        let mut ids: Vec<String> = Vec::new();
        for layer in layers {
            if !ids.contains(&layer.id) {
                ids.push(layer.id.clone());
            }
        }
        Self {
            layers: ids,
            bounds,
            name: name.into(),
            zoom,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a context, failing on any missing or malformed field
    pub fn decode(data: &[u8]) -> Result<Self> {
        let context: PackContext = serde_json::from_slice(data)
            .map_err(|e| Error::Decode(format!("pack context: {}", e)))?;
        context.validate()?;
        Ok(context)
    }

    /// Like [`PackContext::decode`], logging and discarding the error
    pub fn decode_opt(data: &[u8]) -> Option<Self> {
        match Self::decode(data) {
            Ok(context) => Some(context),
            Err(e) => {
                log::warn!("ignoring pack context: {}", e);
                None
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (i, id) in self.layers.iter().enumerate() {
            if self.layers[..i].contains(id) {
                return Err(Error::Validation(format!("duplicate layer id '{}'", id)));
            }
        }
        if !self.bounds.is_valid() {
            return Err(Error::Validation(format!("invalid bounds {:?}", self.bounds)));
        }
        if !self.zoom.is_valid() {
            return Err(Error::Validation(format!(
                "invalid zoom range {}..{}",
                self.zoom.from, self.zoom.to
            )));
        }
        Ok(())
    }

    /// Composes the live layers named by this context and pins every
    /// zoom-capable source to the context's zoom window
    pub fn resolve_fixed_style(
        &self,
        manager: &LayerManager,
        options: &ComposeOptions,
    ) -> Result<StyleDocument> {
        let layers = manager.resolve(&self.layers)?;
        let mut document = compose(layers, options);
        apply_zoom_override(&mut document, &self.zoom);
        Ok(document)
    }
}

/// Forces `minzoom` / `maxzoom` of every zoom-capable source to `zoom`.
///
/// A source is zoom-capable when it declares `minzoom` or `maxzoom` itself.
/// Offline engines ignore the requested zoom window when such a declaration
/// conflicts with it. Sources declaring neither key are left untouched.
pub fn apply_zoom_override(document: &mut StyleDocument, zoom: &ZoomRange) {
    for (id, source) in document.sources.iter_mut() {
        let zoom_capable =
            source.contains_key(SOURCE_MINZOOM) || source.contains_key(SOURCE_MAXZOOM);
        if !zoom_capable {
            continue;
        }
        source.insert(SOURCE_MINZOOM.to_string(), zoom_value(zoom.from));
        source.insert(SOURCE_MAXZOOM.to_string(), zoom_value(zoom.to));
        log::debug!("pinned source {} to zoom {}..{}", id, zoom.from, zoom.to);
    }
}

fn zoom_value(zoom: f64) -> Value {
    if zoom.fract() == 0.0 && zoom >= 0.0 && zoom <= u8::MAX as f64 {
        Value::from(zoom as u64)
    } else {
        Value::from(zoom)
    }
}
