//! Prelude module for common mapsync types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapsync::prelude::*;`

pub use crate::core::{
    config::{FitConfig, PaintConfig, PopupConfig, RasterConfig, StyleConfig, SyncConfig},
    geo::{classify, normalize, to_geographic, Crs},
    map::MapSync,
    style::{StyleReplay, StyleSwitchController},
    viewport::{CameraCommand, Padding, ViewportFitPlanner},
    zoom::{Mailbox, ViewportFitRequest, ZoomKind, ZoomRequestQueue},
};

pub use crate::data::{
    backend::{HttpLayerBackend, LayerBackend, MemoryBackend},
    geojson::{collect_coordinates, Feature, FeatureCollection, Geometry, GeometryClass, Position},
};

pub use crate::layers::{
    base::{BoundingBox, RasterLayer, VectorLayer},
    manager::LayerStore,
    reconciler::{LayerReconciler, ReconcileReport},
    vector::{PaintValue, SubLayerIds},
};

pub use crate::input::events::{ClickEvent, RendererSignal, SignalQueue};

pub use crate::rendering::{
    recording::{RecordingRenderer, RendererCall},
    renderer::{LayerKind, LayerSpec, MapRenderer, SourceDescriptor, Visibility},
};

pub use crate::traits::Configurable;

pub use crate::ui::{popup::Popup, theme::Theme};

pub use crate::{Error as MapSyncError, Result};

pub use geo_types::{Coord, Rect};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
