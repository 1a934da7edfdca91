//! In-memory renderer that keeps live source/layer state and a call log.
//!
//! Used by headless hosts and by the tests to observe exactly which
//! mutations the engine issues.

use crate::{
    core::viewport::CameraCommand,
    data::geojson::{Feature, FeatureCollection},
    input::events::{ClickEvent, RendererSignal},
    layers::vector::PaintValue,
    prelude::{HashMap, HashSet},
    rendering::renderer::{LayerKind, LayerSpec, MapRenderer, SourceDescriptor, Visibility},
    ui::popup::Popup,
    Error, Result,
};
use crossbeam_channel::Sender;
use geo_types::Coord;

/// One mutation the renderer received
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    CreateSource { id: String },
    UpdateSourceData { id: String, features: usize },
    CreateLayer { id: String, kind: LayerKind, source: String },
    SetVisibility { id: String, visibility: Visibility },
    SetPaint { id: String, key: String },
    MoveToTop { id: String },
    FitCamera(CameraCommand),
    SwapStyle { style: String },
    BindClick { layer_id: String },
    UnbindClick { layer_id: String },
    ShowPopup { id: String, text: String },
}

impl RendererCall {
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            RendererCall::CreateSource { .. } | RendererCall::CreateLayer { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLayer {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: HashMap<String, PaintValue>,
    pub visibility: Visibility,
}

pub struct RecordingRenderer {
    style: String,
    sources: HashMap<String, SourceDescriptor>,
    /// Bottom to top
    layers: Vec<RenderedLayer>,
    click_bindings: Vec<String>,
    popups: Vec<Popup>,
    camera: Option<CameraCommand>,
    calls: Vec<RendererCall>,
    signals: Option<Sender<RendererSignal>>,
    failing_layers: HashSet<String>,
}

impl RecordingRenderer {
    pub fn new(style_url: impl Into<String>) -> Self {
        Self {
            style: style_url.into(),
            sources: HashMap::default(),
            layers: Vec::new(),
            click_bindings: Vec::new(),
            popups: Vec::new(),
            camera: None,
            calls: Vec::new(),
            signals: None,
            failing_layers: HashSet::default(),
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn source(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn layer(&self, id: &str) -> Option<&RenderedLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Layer ids from bottom to top
    pub fn layer_order(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.id.as_str()).collect()
    }

    pub fn click_bindings(&self) -> &[String] {
        &self.click_bindings
    }

    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    pub fn camera(&self) -> Option<&CameraCommand> {
        self.camera.as_ref()
    }

    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RendererCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count_calls<F>(&self, predicate: F) -> usize
    where
        F: Fn(&RendererCall) -> bool,
    {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Makes every later `create_layer` for `id` fail
    pub fn fail_layer(&mut self, id: impl Into<String>) {
        self.failing_layers.insert(id.into());
    }

    /// Pushes a signal to the subscribed engine; false when nobody subscribed
    pub fn emit(&self, signal: RendererSignal) -> bool {
        match &self.signals {
            Some(sender) => sender.send(signal).is_ok(),
            None => false,
        }
    }

    pub fn emit_load(&self) -> bool {
        self.emit(RendererSignal::Load)
    }

    /// Signals that the current style finished loading
    pub fn finish_style_load(&self) -> bool {
        self.emit(RendererSignal::StyleReady {
            style: self.style.clone(),
        })
    }

    /// Clicks `layer_id` with explicit features under the cursor.
    ///
    /// Falls back to a plain map click when the layer has no click binding.
    pub fn click_with(
        &self,
        layer_id: &str,
        position: Coord<f64>,
        features: Vec<Feature>,
    ) -> bool {
        if self.click_bindings.iter().any(|bound| bound == layer_id) {
            self.emit(RendererSignal::Click(ClickEvent {
                layer_id: layer_id.to_string(),
                position,
                features,
            }))
        } else {
            self.emit(RendererSignal::MapClick { position })
        }
    }

    /// Clicks `layer_id`; every feature of its source counts as hit, no hit testing
    pub fn click(&self, layer_id: &str, position: Coord<f64>) -> bool {
        let features = self
            .layer(layer_id)
            .and_then(|layer| self.sources.get(&layer.source))
            .map(|source| match source {
                SourceDescriptor::GeoJson { data } => data.features.clone(),
                SourceDescriptor::Raster { .. } => Vec::new(),
            })
            .unwrap_or_default();
        self.click_with(layer_id, position, features)
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut RenderedLayer> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| Error::Renderer(format!("layer '{}' does not exist", id)))
    }
}

impl MapRenderer for RecordingRenderer {
    fn subscribe(&mut self, signals: Sender<RendererSignal>) {
        self.signals = Some(signals);
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn create_source(&mut self, id: &str, descriptor: SourceDescriptor) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(Error::Renderer(format!("source '{}' already exists", id)));
        }
        self.calls.push(RendererCall::CreateSource { id: id.to_string() });
        self.sources.insert(id.to_string(), descriptor);
        Ok(())
    }

    fn update_source_data(&mut self, id: &str, data: &FeatureCollection) -> Result<()> {
        match self.sources.get_mut(id) {
            Some(SourceDescriptor::GeoJson { data: current }) => {
                self.calls.push(RendererCall::UpdateSourceData {
                    id: id.to_string(),
                    features: data.len(),
                });
                *current = data.clone();
                Ok(())
            }
            Some(SourceDescriptor::Raster { .. }) => Err(Error::Renderer(format!(
                "source '{}' is not a geojson source",
                id
            ))),
            None => Err(Error::Renderer(format!("source '{}' does not exist", id))),
        }
    }

    fn create_layer(&mut self, spec: LayerSpec) -> Result<()> {
        if self.failing_layers.contains(&spec.id) {
            return Err(Error::Renderer(format!("layer '{}' was rejected", spec.id)));
        }
        if self.has_layer(&spec.id) {
            return Err(Error::Renderer(format!("layer '{}' already exists", spec.id)));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(Error::Renderer(format!(
                "layer '{}' references missing source '{}'",
                spec.id, spec.source
            )));
        }
        self.calls.push(RendererCall::CreateLayer {
            id: spec.id.clone(),
            kind: spec.kind,
            source: spec.source.clone(),
        });
        self.layers.push(RenderedLayer {
            id: spec.id,
            kind: spec.kind,
            source: spec.source,
            paint: spec
                .paint
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            visibility: spec.visibility,
        });
        Ok(())
    }

    fn set_layer_visibility(&mut self, id: &str, visibility: Visibility) -> Result<()> {
        self.layer_mut(id)?.visibility = visibility;
        self.calls.push(RendererCall::SetVisibility {
            id: id.to_string(),
            visibility,
        });
        Ok(())
    }

    fn set_paint_property(&mut self, id: &str, key: &str, value: &PaintValue) -> Result<()> {
        self.layer_mut(id)?
            .paint
            .insert(key.to_string(), value.clone());
        self.calls.push(RendererCall::SetPaint {
            id: id.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn move_layer_to_top(&mut self, id: &str) -> Result<()> {
        let index = self
            .layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| Error::Renderer(format!("layer '{}' does not exist", id)))?;
        let layer = self.layers.remove(index);
        self.layers.push(layer);
        self.calls.push(RendererCall::MoveToTop { id: id.to_string() });
        Ok(())
    }

    fn fit_camera(&mut self, command: &CameraCommand) -> Result<()> {
        self.camera = Some(command.clone());
        self.calls.push(RendererCall::FitCamera(command.clone()));
        Ok(())
    }

    fn swap_base_style(&mut self, style_url: &str) -> Result<()> {
        self.style = style_url.to_string();
        self.sources.clear();
        self.layers.clear();
        self.click_bindings.clear();
        self.calls.push(RendererCall::SwapStyle {
            style: style_url.to_string(),
        });
        Ok(())
    }

    fn bind_click(&mut self, layer_id: &str) -> Result<()> {
        self.click_bindings.push(layer_id.to_string());
        self.calls.push(RendererCall::BindClick {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    fn unbind_click(&mut self, layer_id: &str) -> Result<()> {
        self.click_bindings.retain(|bound| bound != layer_id);
        self.calls.push(RendererCall::UnbindClick {
            layer_id: layer_id.to_string(),
        });
        Ok(())
    }

    fn show_popup(&mut self, popup: &Popup) -> Result<()> {
        self.calls.push(RendererCall::ShowPopup {
            id: popup.id.clone(),
            text: popup.text.clone(),
        });
        self.popups.push(popup.clone());
        Ok(())
    }
}
