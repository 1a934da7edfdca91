//! # mapsync
//!
//! Keeps a stateful map renderer (a Mapbox-GL-style source/layer surface) in
//! sync with a changing list of user uploaded layers.
//!
//! The engine normalizes coordinates between geographic degrees and
//! spherical-Mercator meters, flattens GeoJSON geometry trees, plans camera
//! framing, reconciles the desired vector/raster layer set against the
//! renderer with minimal churn, and replays that reconciliation after a
//! destructive basemap swap.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::SyncConfig,
    geo::{classify, normalize, to_geographic, Crs},
    map::MapSync,
    style::{StyleReplay, StyleSwitchController},
    viewport::{CameraCommand, Padding, ViewportFitPlanner},
    zoom::{Mailbox, ViewportFitRequest, ZoomKind, ZoomRequestQueue},
};

pub use data::{
    backend::{HttpLayerBackend, LayerBackend, MemoryBackend},
    geojson::{Feature, FeatureCollection, Geometry, GeometryClass},
};

pub use layers::{
    base::{BoundingBox, RasterLayer, VectorLayer},
    manager::LayerStore,
    reconciler::{LayerReconciler, ReconcileReport},
};

pub use input::events::{ClickEvent, RendererSignal};

pub use rendering::{
    recording::{RecordingRenderer, RendererCall},
    renderer::{LayerSpec, MapRenderer, SourceDescriptor},
};

pub use ui::{popup::Popup, theme::Theme};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapSyncError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapSyncError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapSyncError;
