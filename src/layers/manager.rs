use crate::{
    data::geojson::FeatureCollection,
    layers::base::{RasterLayer, VectorLayer},
    prelude::HashSet,
};

/// The desired vector and raster layer lists, in display order.
///
/// This is what the reconciler is asked to show. It never talks to the
/// renderer itself.
#[derive(Debug, Clone, Default)]
pub struct LayerStore {
    vectors: Vec<VectorLayer>,
    rasters: Vec<RasterLayer>,
    /// Suffix duplicate names instead of replacing the layer with that name
    unique_names: bool,
    next_id: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_names(mut self, unique_names: bool) -> Self {
        self.unique_names = unique_names;
        self
    }

    pub fn vectors(&self) -> &[VectorLayer] {
        &self.vectors
    }

    pub fn rasters(&self) -> &[RasterLayer] {
        &self.rasters
    }

    pub fn vector(&self, id: &str) -> Option<&VectorLayer> {
        self.vectors.iter().find(|layer| layer.id == id)
    }

    pub fn raster(&self, id: &str) -> Option<&RasterLayer> {
        self.rasters.iter().find(|layer| layer.id == id)
    }

    pub fn set_vectors(&mut self, vectors: Vec<VectorLayer>) {
        self.vectors = vectors;
    }

    pub fn set_rasters(&mut self, rasters: Vec<RasterLayer>) {
        self.rasters = rasters;
    }

    /// Adds uploaded data and returns the id of the layer that now holds it.
    ///
    /// An upload whose name matches an existing layer replaces that layer's
    /// data in place and makes it visible again, unless unique names are on,
    /// in which case the upload is appended as `"name (2)"`, `"name (3)"`, ...
    pub fn upload_vector(&mut self, name: &str, data: FeatureCollection) -> String {
        if !self.unique_names {
            if let Some(existing) = self.vectors.iter_mut().find(|layer| layer.name == name) {
                existing.data = data;
                existing.visible = true;
                log::debug!("replaced data of layer {} ({})", existing.id, name);
                return existing.id.clone();
            }
        }

        let name = self.unique_name(name);
        let id = self.fresh_id();
        log::debug!("added layer {} ({})", id, name);
        self.vectors.push(VectorLayer::new(id.clone(), name, data));
        id
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.unique_names {
            return base.to_string();
        }
        let taken: HashSet<&str> = self.vectors.iter().map(|l| l.name.as_str()).collect();
        if !taken.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{} ({})", base, n))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("layer-{}", self.next_id);
            if self.vector(&id).is_none() {
                return id;
            }
        }
    }

    /// Rasters are appended as given, never merged
    pub fn add_raster(&mut self, raster: RasterLayer) {
        self.rasters.push(raster);
    }

    /// Flips visibility, returning the new flag
    pub fn toggle_vector(&mut self, id: &str) -> Option<bool> {
        let layer = self.vectors.iter_mut().find(|layer| layer.id == id)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    pub fn set_vector_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.vectors.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_raster_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.rasters.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn remove_vector(&mut self, id: &str) -> Option<VectorLayer> {
        let index = self.vectors.iter().position(|layer| layer.id == id)?;
        Some(self.vectors.remove(index))
    }
}
