//! The renderer contract the engine drives.
//!
//! A renderer is a stateful source/layer surface in the style of Mapbox GL:
//! sources hold data, layers draw a source with a paint and layout, and the
//! most recently added layer draws on top. The engine owns exactly one
//! renderer and is the only code that mutates it.

use crate::{
    core::viewport::CameraCommand,
    data::geojson::FeatureCollection,
    input::events::RendererSignal,
    layers::vector::PaintValue,
    ui::popup::Popup,
    Result,
};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Data source registered with the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceDescriptor {
    GeoJson {
        data: FeatureCollection,
    },
    Raster {
        tiles: Vec<String>,
        #[serde(rename = "tileSize")]
        tile_size: u32,
    },
}

/// Drawing primitive of a renderer layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
    Circle,
    Raster,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Fill => write!(f, "fill"),
            LayerKind::Line => write!(f, "line"),
            LayerKind::Circle => write!(f, "circle"),
            LayerKind::Raster => write!(f, "raster"),
        }
    }
}

/// Layout visibility of a renderer layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    None,
}

impl Visibility {
    pub fn from_flag(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::None
        }
    }
}

/// Ordered paint properties
pub type Paint = Vec<(&'static str, PaintValue)>;

/// Everything needed to add one renderer layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: Paint,
    pub visibility: Visibility,
}

/// Mutation and signal surface of a stateful map renderer.
///
/// All calls are synchronous and their effect is observable immediately
/// through `has_source` / `has_layer`. Implementations report failures as
/// [`crate::Error::Renderer`]; the engine never retries.
pub trait MapRenderer {
    /// Hands the renderer the channel it pushes load, style-ready and click signals into
    fn subscribe(&mut self, signals: Sender<RendererSignal>);

    fn has_source(&self, id: &str) -> bool;

    fn has_layer(&self, id: &str) -> bool;

    fn create_source(&mut self, id: &str, descriptor: SourceDescriptor) -> Result<()>;

    /// Replaces the data of an existing GeoJSON source
    fn update_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<()>;

    /// Adds a layer on top of every existing layer
    fn create_layer(&mut self, spec: LayerSpec) -> Result<()>;

    fn set_layer_visibility(&mut self, id: &str, visibility: Visibility) -> Result<()>;

    fn set_paint_property(&mut self, id: &str, key: &str, value: &PaintValue) -> Result<()>;

    fn move_layer_to_top(&mut self, id: &str) -> Result<()>;

    fn fit_camera(&mut self, command: &CameraCommand) -> Result<()>;

    /// Replaces the basemap style; discards every source and layer added so far
    fn swap_base_style(&mut self, style_url: &str) -> Result<()>;

    /// Starts delivering clicks on `layer_id` as [`RendererSignal::Click`]
    fn bind_click(&mut self, layer_id: &str) -> Result<()>;

    fn unbind_click(&mut self, layer_id: &str) -> Result<()>;

    fn show_popup(&mut self, popup: &Popup) -> Result<()>;
}

/// Lets the engine own a `Box<dyn MapRenderer>` chosen at runtime
impl<R: MapRenderer + ?Sized> MapRenderer for Box<R> {
    fn subscribe(&mut self, signals: Sender<RendererSignal>) {
        (**self).subscribe(signals)
    }

    fn has_source(&self, id: &str) -> bool {
        (**self).has_source(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        (**self).has_layer(id)
    }

    fn create_source(&mut self, id: &str, descriptor: SourceDescriptor) -> Result<()> {
        (**self).create_source(id, descriptor)
    }

    fn update_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<()> {
        (**self).update_source_data(id, data)
    }

    fn create_layer(&mut self, spec: LayerSpec) -> Result<()> {
        (**self).create_layer(spec)
    }

    fn set_layer_visibility(&mut self, id: &str, visibility: Visibility) -> Result<()> {
        (**self).set_layer_visibility(id, visibility)
    }

    fn set_paint_property(&mut self, id: &str, key: &str, value: &PaintValue) -> Result<()> {
        (**self).set_paint_property(id, key, value)
    }

    fn move_layer_to_top(&mut self, id: &str) -> Result<()> {
        (**self).move_layer_to_top(id)
    }

    fn fit_camera(&mut self, command: &CameraCommand) -> Result<()> {
        (**self).fit_camera(command)
    }

    fn swap_base_style(&mut self, style_url: &str) -> Result<()> {
        (**self).swap_base_style(style_url)
    }

    fn bind_click(&mut self, layer_id: &str) -> Result<()> {
        (**self).bind_click(layer_id)
    }

    fn unbind_click(&mut self, layer_id: &str) -> Result<()> {
        (**self).unbind_click(layer_id)
    }

    fn show_popup(&mut self, popup: &Popup) -> Result<()> {
        (**self).show_popup(popup)
    }
}
