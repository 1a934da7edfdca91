use crate::{
    core::{
        config::SyncConfig,
        style::{StyleReplay, StyleSwitchController},
        viewport::{CameraCommand, ViewportFitPlanner},
        zoom::{ViewportFitRequest, ZoomKind, ZoomRequestQueue},
    },
    data::{
        backend::LayerBackend,
        geojson::{parse_feature_collection, FeatureCollection},
    },
    input::events::{ClickEvent, RendererSignal, SignalQueue},
    layers::{
        base::{RasterLayer, VectorLayer},
        manager::LayerStore,
        reconciler::{LayerReconciler, ReconcileReport},
    },
    rendering::renderer::MapRenderer,
    traits::Configurable,
    ui::popup::{area_popup, Popup},
    Result,
};

/// Keeps one renderer in sync with the desired layer set.
///
/// The engine owns the renderer and is its only writer. Renderer signals
/// arrive through a queue and are dispatched by [`MapSync::pump_signals`],
/// so no pass ever runs inside a renderer call.
pub struct MapSync<R: MapRenderer> {
    renderer: R,
    config: SyncConfig,
    signals: SignalQueue,
    store: LayerStore,
    reconciler: LayerReconciler,
    planner: ViewportFitPlanner,
    style: StyleSwitchController,
    zoom: ZoomRequestQueue,
    /// Set by the first load signal; passes and zooms wait for it
    loaded: bool,
    popup: Option<Popup>,
    last_report: Option<ReconcileReport>,
}

impl<R: MapRenderer> MapSync<R> {
    pub fn new(mut renderer: R, config: SyncConfig) -> Self {
        let signals = SignalQueue::new();
        renderer.subscribe(signals.sender());

        Self {
            renderer,
            signals,
            store: LayerStore::new(),
            reconciler: LayerReconciler::new(config.paint.clone(), config.raster.clone()),
            planner: ViewportFitPlanner::new(config.fit.clone()),
            style: StyleSwitchController::new(config.style.default_theme.clone()),
            zoom: ZoomRequestQueue::new(),
            loaded: false,
            popup: None,
            last_report: None,
            config,
        }
    }

    /// Uses `store` as the initial desired layer set
    pub fn with_store(mut self, store: LayerStore) -> Self {
        self.store = store;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Direct renderer access for hosts; mutations made here bypass reconciliation
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn current_theme(&self) -> &str {
        self.style.current_theme()
    }

    pub fn is_style_pending(&self) -> bool {
        self.style.is_pending()
    }

    /// The popup currently open, if any
    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn last_report(&self) -> Option<&ReconcileReport> {
        self.last_report.as_ref()
    }

    pub fn set_vector_layers(&mut self, layers: Vec<VectorLayer>) -> Option<ReconcileReport> {
        self.store.set_vectors(layers);
        self.reconcile()
    }

    pub fn set_raster_layers(&mut self, layers: Vec<RasterLayer>) -> Option<ReconcileReport> {
        self.store.set_rasters(layers);
        self.reconcile()
    }

    /// Runs one full pass against the current store.
    ///
    /// Returns `None` when the pass was skipped: before the map loaded, or
    /// while a style swap is pending (its replay will cover the change).
    pub fn reconcile(&mut self) -> Option<ReconcileReport> {
        if !self.loaded {
            log::debug!("map not loaded yet, deferring reconciliation");
            return None;
        }
        if self.style.is_pending() {
            log::debug!("style swap pending, deferring reconciliation to its replay");
            return None;
        }

        let report = self.reconciler.reconcile(
            &mut self.renderer,
            self.store.vectors(),
            self.store.rasters(),
        );
        self.last_report = Some(report.clone());
        Some(report)
    }

    /// Stores an upload, reconciles and frames the resulting layer
    pub fn upload_vector(&mut self, name: &str, data: FeatureCollection) -> String {
        let id = self.store.upload_vector(name, data);
        self.reconcile();
        self.request_vector_zoom(id.clone());
        id
    }

    /// Parses a `.geojson` document and uploads it under `name`
    pub fn upload_geojson(&mut self, name: &str, geojson: &str) -> Result<String> {
        let data = parse_feature_collection(geojson)?;
        Ok(self.upload_vector(name, data))
    }

    pub fn add_raster(&mut self, layer: RasterLayer) -> Option<ReconcileReport> {
        self.store.add_raster(layer);
        self.reconcile()
    }

    /// Flips a vector layer's visibility; `None` for an unknown id
    pub fn toggle_vector(&mut self, id: &str) -> Option<bool> {
        let visible = self.store.toggle_vector(id)?;
        self.reconcile();
        Some(visible)
    }

    pub fn set_vector_visible(&mut self, id: &str, visible: bool) -> bool {
        let found = self.store.set_vector_visible(id, visible);
        if found {
            self.reconcile();
        }
        found
    }

    pub fn set_raster_visible(&mut self, id: &str, visible: bool) -> bool {
        let found = self.store.set_raster_visible(id, visible);
        if found {
            self.reconcile();
        }
        found
    }

    /// Swaps the basemap; the returned future resolves once the layers are replayed
    pub fn change_theme(&mut self, theme: &str) -> Result<StyleReplay> {
        let replay = self
            .style
            .request(&mut self.renderer, theme, &self.config.style)?;
        self.reconciler.reset();
        self.popup = None;
        Ok(replay)
    }

    pub fn request_vector_zoom(&mut self, id: impl Into<String>) {
        self.zoom.request_vector(id);
        self.process_zoom_requests();
    }

    pub fn request_raster_zoom(&mut self, id: impl Into<String>) {
        self.zoom.request_raster(id);
        self.process_zoom_requests();
    }

    /// Consumes pending zoom requests once the map is loaded.
    ///
    /// Each request is cleared whether or not its layer exists; returns the
    /// camera commands that were issued.
    pub fn process_zoom_requests(&mut self) -> Vec<CameraCommand> {
        if !self.loaded {
            return Vec::new();
        }

        let mut issued = Vec::new();
        for request in self.zoom.drain() {
            match self.plan_zoom(&request) {
                Some(command) => {
                    log::debug!("framing {:?} layer {}", request.kind, request.target_id);
                    if let Err(e) = self.renderer.fit_camera(&command) {
                        log::warn!("camera fit for {} failed: {}", request.target_id, e);
                        continue;
                    }
                    issued.push(command);
                }
                None => log::warn!(
                    "dropping {:?} zoom request for {}: no matching layer to frame",
                    request.kind,
                    request.target_id
                ),
            }
        }
        issued
    }

    fn plan_zoom(&self, request: &ViewportFitRequest) -> Option<CameraCommand> {
        match request.kind {
            ZoomKind::Vector => {
                let layer = self.store.vector(&request.target_id)?;
                self.planner.plan_features(&layer.data.features)
            }
            ZoomKind::Raster => {
                let layer = self.store.raster(&request.target_id)?;
                let bbox = layer.bounding_box.as_ref()?;
                Some(self.planner.plan_raster(bbox))
            }
        }
    }

    /// Dispatches every queued renderer signal; returns how many were handled
    pub fn pump_signals(&mut self) -> usize {
        if self.popup.as_ref().is_some_and(Popup::should_auto_close) {
            self.popup = None;
        }

        let signals = self.signals.drain();
        let count = signals.len();
        for signal in signals {
            self.handle_signal(signal);
        }
        count
    }

    pub fn handle_signal(&mut self, signal: RendererSignal) {
        log::debug!("handling {} signal", signal.name());
        match signal {
            RendererSignal::Load => {
                self.loaded = true;
                log::info!("map loaded with {} layers", self.store.vectors().len());
                self.reconcile();
                self.process_zoom_requests();
            }
            RendererSignal::StyleReady { style } => {
                let Some(pending) = self.style.take_ready(&style) else {
                    return;
                };
                self.loaded = true;
                let report = self.reconcile().unwrap_or_default();
                log::info!(
                    "replayed layers onto {}: {} sources and {} layers created",
                    style,
                    report.created_sources,
                    report.created_layers
                );
                pending.complete(report);
            }
            RendererSignal::Click(event) => self.handle_click(event),
            RendererSignal::MapClick { .. } => {
                if self.popup.as_ref().is_some_and(|p| p.close_on_click) {
                    self.popup = None;
                }
            }
        }
    }

    fn handle_click(&mut self, event: ClickEvent) {
        if !self.reconciler.is_click_target(&event.layer_id) {
            log::debug!("ignoring click on unbound layer {}", event.layer_id);
            return;
        }
        let Some(feature) = event.features.first() else {
            return;
        };

        let popup = area_popup(&event.layer_id, feature, event.position, &self.config.popup);
        match self.renderer.show_popup(&popup) {
            Ok(()) => self.popup = Some(popup),
            Err(e) => log::warn!("failed to show popup on {}: {}", event.layer_id, e),
        }
    }

    /// Deletes a vector layer remotely (best effort) and then locally.
    ///
    /// The layer's sub-layers are hidden; their sources stay registered.
    pub async fn delete_vector_layer(
        &mut self,
        id: &str,
        backend: &dyn LayerBackend,
    ) -> Option<VectorLayer> {
        if let Err(e) = backend.delete_vector_layer(id).await {
            log::warn!("backend delete of {} failed, removing locally: {}", id, e);
        }

        let removed = self.store.remove_vector(id)?;
        if !self.style.is_pending() {
            if let Err(e) = self.reconciler.hide_vector(&mut self.renderer, id) {
                log::warn!("failed to hide removed layer {}: {}", id, e);
            }
        }
        Some(removed)
    }

    /// Reloads both layer lists from `backend`, keeping a list whose fetch fails
    pub async fn refresh_from(&mut self, backend: &dyn LayerBackend) -> Option<ReconcileReport> {
        match backend.fetch_vector_layers().await {
            Ok(layers) => self.store.set_vectors(layers),
            Err(e) => log::warn!("skipping remote vector layers: {}", e),
        }
        match backend.fetch_raster_layers().await {
            Ok(layers) => self.store.set_rasters(layers),
            Err(e) => log::warn!("skipping remote raster layers: {}", e),
        }
        self.reconcile()
    }
}

impl<R: MapRenderer> Configurable for MapSync<R> {
    type Config = SyncConfig;

    fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn set_config(&mut self, config: SyncConfig) -> Result<()> {
        Self::validate_config(&config)?;
        self.reconciler
            .set_config(config.paint.clone(), config.raster.clone());
        self.planner = ViewportFitPlanner::new(config.fit.clone());
        self.config = config;
        Ok(())
    }

    fn validate_config(config: &SyncConfig) -> Result<()> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::geojson::{Feature, Geometry, Position},
        layers::base::BoundingBox,
        rendering::recording::{RecordingRenderer, RendererCall},
    };
    use geo_types::Coord;

    fn engine() -> MapSync<RecordingRenderer> {
        MapSync::new(
            RecordingRenderer::new("mapbox://styles/mapbox/streets-v11"),
            SyncConfig::default(),
        )
    }

    fn loaded() -> MapSync<RecordingRenderer> {
        let mut map = engine();
        map.renderer().emit_load();
        map.pump_signals();
        map
    }

    fn points(coords: &[(f64, f64)]) -> FeatureCollection {
        FeatureCollection::new(
            coords
                .iter()
                .map(|&(x, y)| {
                    Feature::new(Geometry::Point {
                        coordinates: Position::new(x, y),
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn test_nothing_happens_before_load() {
        let mut map = engine();
        assert!(map
            .set_vector_layers(vec![VectorLayer::new("a", "a", points(&[(1.0, 1.0)]))])
            .is_none());
        assert!(map.renderer().calls().is_empty());

        map.renderer().emit_load();
        assert_eq!(map.pump_signals(), 1);
        assert!(map.is_loaded());
        assert!(map.renderer().has_layer("geojson-layer-a-points"));
    }

    #[test]
    fn test_upload_frames_new_layer() {
        let mut map = loaded();
        let id = map.upload_vector("stops", points(&[(1.0, 2.0)]));
        assert_eq!(
            map.renderer().camera(),
            Some(&CameraCommand::EaseTo {
                center: Coord { x: 1.0, y: 2.0 },
                zoom: 13.0,
                duration_ms: 300,
            })
        );
        assert_eq!(map.store().vector(&id).map(|l| l.name.as_str()), Some("stops"));
    }

    #[test]
    fn test_upload_geojson_rejects_garbage() {
        let mut map = loaded();
        assert!(map.upload_geojson("bad", "{\"type\":\"Topology\"}").is_err());
        assert!(map.store().vectors().is_empty());
    }

    #[test]
    fn test_zoom_waits_for_load() {
        let mut map = engine();
        map.set_raster_layers(vec![RasterLayer::new(
            "r1",
            "ortho",
            "https://t/{z}/{x}/{y}.png",
            BoundingBox::new(10.0, 20.0, 12.0, 22.0),
        )]);
        map.request_raster_zoom("r1");
        assert!(map.renderer().camera().is_none());

        map.renderer().emit_load();
        map.pump_signals();
        let bounds = map.renderer().camera().and_then(CameraCommand::bounds_array);
        assert_eq!(bounds, Some([[10.0, 20.0], [12.0, 22.0]]));
    }

    #[test]
    fn test_config_update_is_validated() {
        let mut map = engine();
        assert!(map.update_config(|c| c.raster.tile_size = 0).is_err());
        assert_eq!(map.config().raster.tile_size, 512);

        map.update_config(|c| c.fit.single_point_zoom = 16.0).unwrap();
        map.renderer().emit_load();
        map.pump_signals();
        map.upload_vector("p", points(&[(0.0, 0.0)]));
        assert!(matches!(
            map.renderer().camera(),
            Some(CameraCommand::EaseTo { zoom, .. }) if *zoom == 16.0
        ));
    }

    #[test]
    fn test_popup_auto_closes_on_later_pump() {
        let mut map = loaded();
        map.update_config(|c| c.popup.auto_close_ms = Some(1)).unwrap();
        let parcel = Feature::new(Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(1.0, 1.0),
                Position::new(0.0, 0.0),
            ]],
        });
        map.set_vector_layers(vec![VectorLayer::new("a", "a", FeatureCollection::new(vec![parcel]))]);

        map.renderer()
            .click("geojson-layer-a-polygons", Coord { x: 0.5, y: 0.5 });
        map.pump_signals();
        assert!(map.popup().is_some());

        std::thread::sleep(std::time::Duration::from_millis(5));
        map.pump_signals();
        assert!(map.popup().is_none());
    }

    #[test]
    fn test_map_click_closes_popup() {
        let mut map = loaded();
        let polygon = Feature::new(Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(1.0, 1.0),
                Position::new(0.0, 0.0),
            ]],
        })
        .with_property("area", serde_json::json!("40"));
        map.set_vector_layers(vec![VectorLayer::new("a", "a", FeatureCollection::new(vec![polygon]))]);

        map.renderer()
            .click("geojson-layer-a-polygons", Coord { x: 0.5, y: 0.5 });
        map.pump_signals();
        assert_eq!(map.popup().map(|p| p.text.as_str()), Some("40.00 m²"));
        assert_eq!(
            map.renderer()
                .count_calls(|c| matches!(c, RendererCall::ShowPopup { .. })),
            1
        );

        map.renderer().click("nowhere", Coord { x: 5.0, y: 5.0 });
        map.pump_signals();
        assert!(map.popup().is_none());
    }
}
