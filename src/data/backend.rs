//! Remote store of uploaded layers.
//!
//! The engine only reads layer lists from it and asks it to delete; both are
//! best effort and a failure never blocks the local map state.

use crate::{
    layers::base::{RasterLayer, VectorLayer},
    Error, Result,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait LayerBackend: Send + Sync {
    async fn fetch_vector_layers(&self) -> Result<Vec<VectorLayer>>;

    async fn fetch_raster_layers(&self) -> Result<Vec<RasterLayer>>;

    async fn delete_vector_layer(&self, id: &str) -> Result<()>;
}

/// JSON-over-HTTP backend
///
/// `GET {base}/api/layers`, `GET {base}/api/tiff-layers` and
/// `DELETE {base}/api/layers/{id}`.
#[derive(Debug, Clone)]
pub struct HttpLayerBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLayerBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mapsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl LayerBackend for HttpLayerBackend {
    async fn fetch_vector_layers(&self) -> Result<Vec<VectorLayer>> {
        self.get_json("/api/layers").await
    }

    async fn fetch_raster_layers(&self) -> Result<Vec<RasterLayer>> {
        self.get_json("/api/tiff-layers").await
    }

    async fn delete_vector_layer(&self, id: &str) -> Result<()> {
        self.client
            .delete(self.endpoint(&format!("/api/layers/{}", id)))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// In-process backend for headless hosts and tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    vectors: Mutex<Vec<VectorLayer>>,
    rasters: Mutex<Vec<RasterLayer>>,
    offline: bool,
    reject_deletes: bool,
}

impl MemoryBackend {
    pub fn new(vectors: Vec<VectorLayer>, rasters: Vec<RasterLayer>) -> Self {
        Self {
            vectors: Mutex::new(vectors),
            rasters: Mutex::new(rasters),
            ..Default::default()
        }
    }

    /// Every fetch fails
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Every delete fails, like a store that denies the write
    pub fn rejecting_deletes(mut self) -> Self {
        self.reject_deletes = true;
        self
    }

    pub fn vector_ids(&self) -> Vec<String> {
        self.vectors
            .lock()
            .map(|layers| layers.iter().map(|layer| layer.id.clone()).collect())
            .unwrap_or_default()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Backend("backend is offline".to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Backend("backend state lock poisoned".to_string())
}

#[async_trait]
impl LayerBackend for MemoryBackend {
    async fn fetch_vector_layers(&self) -> Result<Vec<VectorLayer>> {
        self.check_online()?;
        Ok(self.vectors.lock().map_err(poisoned)?.clone())
    }

    async fn fetch_raster_layers(&self) -> Result<Vec<RasterLayer>> {
        self.check_online()?;
        Ok(self.rasters.lock().map_err(poisoned)?.clone())
    }

    async fn delete_vector_layer(&self, id: &str) -> Result<()> {
        self.check_online()?;
        if self.reject_deletes {
            return Err(Error::Backend(format!("delete of {} denied", id)));
        }
        let mut vectors = self.vectors.lock().map_err(poisoned)?;
        let before = vectors.len();
        vectors.retain(|layer| layer.id != id);
        if vectors.len() == before {
            return Err(Error::Backend(format!("layer {} not found", id)));
        }
        Ok(())
    }
}
