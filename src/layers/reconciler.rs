//! Brings the renderer's live sources and layers in line with the desired
//! vector and raster layer sets.
//!
//! A pass only ever creates what is missing and updates what exists; it never
//! removes a source or layer. Each vector layer is split by geometry class
//! into polygon, line and point subsets, each with its own source and
//! sub-layers. Subsets that become empty leave their sub-layers in place.
//! Point sub-layers are raised to the top at the end of every pass.

use crate::{
    core::{
        config::{PaintConfig, RasterConfig},
        constants::RASTER_LAYER_PREFIX,
    },
    data::geojson::{FeatureCollection, GeometryClass},
    layers::{
        base::{RasterLayer, VectorLayer},
        vector::{line_plans, point_plans, polygon_plans, SubLayerIds, SubLayerPlan},
    },
    prelude::{HashMap, HashSet},
    rendering::renderer::{LayerKind, LayerSpec, MapRenderer, SourceDescriptor, Visibility},
    Result,
};

/// What one reconciliation pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created_sources: usize,
    pub updated_sources: usize,
    pub created_layers: usize,
    /// `(logical layer id, error)` for layers whose sync stopped early
    pub failures: Vec<(String, String)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when the pass created nothing
    pub fn is_noop(&self) -> bool {
        self.created_sources == 0 && self.created_layers == 0
    }
}

pub struct LayerReconciler {
    paint: PaintConfig,
    raster: RasterConfig,
    /// Visibility last applied to each raster renderer layer
    raster_visibility: HashMap<String, bool>,
    /// Polygon fill layers whose clicks open the area popup
    click_targets: HashSet<String>,
}

impl LayerReconciler {
    pub fn new(paint: PaintConfig, raster: RasterConfig) -> Self {
        Self {
            paint,
            raster,
            raster_visibility: HashMap::default(),
            click_targets: HashSet::default(),
        }
    }

    pub fn set_config(&mut self, paint: PaintConfig, raster: RasterConfig) {
        self.paint = paint;
        self.raster = raster;
    }

    pub fn is_click_target(&self, layer_id: &str) -> bool {
        self.click_targets.contains(layer_id)
    }

    /// Forgets per-renderer bookkeeping after the renderer dropped its state
    pub fn reset(&mut self) {
        self.raster_visibility.clear();
        self.click_targets.clear();
    }

    /// Runs one full pass: rasters first so vector layers draw above them
    pub fn reconcile<R>(
        &mut self,
        renderer: &mut R,
        vectors: &[VectorLayer],
        rasters: &[RasterLayer],
    ) -> ReconcileReport
    where
        R: MapRenderer + ?Sized,
    {
        let mut report = ReconcileReport::default();

        for raster in rasters {
            if let Err(e) = self.sync_raster(renderer, raster, &mut report) {
                log::warn!("raster layer {} failed to sync: {}", raster.id, e);
                report.failures.push((raster.id.clone(), e.to_string()));
            }
        }

        for layer in vectors {
            if let Err(e) = self.sync_vector(renderer, layer, &mut report) {
                log::warn!("vector layer {} failed to sync: {}", layer.id, e);
                report.failures.push((layer.id.clone(), e.to_string()));
            }
        }

        // Points draw above everything, including layers created later in this pass
        for layer in vectors {
            let points = SubLayerIds::for_layer(&layer.id).points;
            if renderer.has_layer(&points) {
                if let Err(e) = renderer.move_layer_to_top(&points) {
                    log::warn!("failed to raise {}: {}", points, e);
                    report.failures.push((layer.id.clone(), e.to_string()));
                }
            }
        }

        log::debug!(
            "reconciled {} vector / {} raster layers: {} sources and {} layers created, {} sources updated",
            vectors.len(),
            rasters.len(),
            report.created_sources,
            report.created_layers,
            report.updated_sources
        );
        report
    }

    fn sync_raster<R>(
        &mut self,
        renderer: &mut R,
        raster: &RasterLayer,
        report: &mut ReconcileReport,
    ) -> Result<()>
    where
        R: MapRenderer + ?Sized,
    {
        if !raster.is_renderable() {
            log::debug!("skipping raster layer '{}' without id or tile url", raster.name);
            return Ok(());
        }

        let id = format!("{}{}", RASTER_LAYER_PREFIX, raster.id);
        if !renderer.has_source(&id) {
            renderer.create_source(
                &id,
                SourceDescriptor::Raster {
                    tiles: vec![raster.tile_url_template.clone()],
                    tile_size: self.raster.tile_size,
                },
            )?;
            report.created_sources += 1;
        }

        if !renderer.has_layer(&id) {
            renderer.create_layer(LayerSpec {
                id: id.clone(),
                kind: LayerKind::Raster,
                source: id.clone(),
                paint: Vec::new(),
                visibility: Visibility::from_flag(raster.visible),
            })?;
            report.created_layers += 1;
            log::debug!("created raster layer {}", id);
        } else if self.raster_visibility.get(&id) != Some(&raster.visible) {
            renderer.set_layer_visibility(&id, Visibility::from_flag(raster.visible))?;
        }
        self.raster_visibility.insert(id, raster.visible);
        Ok(())
    }

    fn sync_vector<R>(
        &mut self,
        renderer: &mut R,
        layer: &VectorLayer,
        report: &mut ReconcileReport,
    ) -> Result<()>
    where
        R: MapRenderer + ?Sized,
    {
        let ids = SubLayerIds::for_layer(&layer.id);
        let visibility = Visibility::from_flag(layer.visible);

        let subsets = [
            (
                GeometryClass::Polygon,
                ids.polygons.clone(),
                polygon_plans(&ids, &self.paint),
            ),
            (GeometryClass::Line, ids.lines.clone(), line_plans(&ids, &self.paint)),
            (GeometryClass::Point, ids.points.clone(), point_plans(&ids, &self.paint)),
        ];

        for (class, source_id, plans) in subsets {
            let subset = layer.data.of_class(class);
            if subset.is_empty() {
                // Stale sub-layers keep their data but still follow the toggle
                for plan in &plans {
                    if renderer.has_layer(&plan.id) {
                        renderer.set_layer_visibility(&plan.id, visibility)?;
                    }
                }
                continue;
            }

            Self::ensure_source(renderer, &source_id, &subset, report)?;
            for plan in &plans {
                Self::ensure_layer(renderer, plan, &source_id, visibility, report)?;
            }

            if class == GeometryClass::Polygon {
                // Replace, never stack, the fill's click binding
                renderer.unbind_click(&ids.polygons)?;
                renderer.bind_click(&ids.polygons)?;
                self.click_targets.insert(ids.polygons.clone());
            }
        }
        Ok(())
    }

    fn ensure_source<R>(
        renderer: &mut R,
        id: &str,
        data: &FeatureCollection,
        report: &mut ReconcileReport,
    ) -> Result<()>
    where
        R: MapRenderer + ?Sized,
    {
        if renderer.has_source(id) {
            renderer.update_source_data(id, data)?;
            report.updated_sources += 1;
        } else {
            renderer.create_source(id, SourceDescriptor::GeoJson { data: data.clone() })?;
            report.created_sources += 1;
            log::debug!("created source {} ({} features)", id, data.len());
        }
        Ok(())
    }

    fn ensure_layer<R>(
        renderer: &mut R,
        plan: &SubLayerPlan,
        source_id: &str,
        visibility: Visibility,
        report: &mut ReconcileReport,
    ) -> Result<()>
    where
        R: MapRenderer + ?Sized,
    {
        if !renderer.has_layer(&plan.id) {
            renderer.create_layer(LayerSpec {
                id: plan.id.clone(),
                kind: plan.kind,
                source: source_id.to_string(),
                paint: plan.paint.clone(),
                visibility,
            })?;
            report.created_layers += 1;
            log::debug!("created {} layer {}", plan.kind, plan.id);
            return Ok(());
        }

        renderer.set_layer_visibility(&plan.id, visibility)?;
        for (key, value) in &plan.paint {
            renderer.set_paint_property(&plan.id, key, value)?;
        }
        Ok(())
    }

    /// Hides every materialized sub-layer of a removed vector layer.
    ///
    /// Sources are kept; the renderer contract has no removal call.
    pub fn hide_vector<R>(&mut self, renderer: &mut R, layer_id: &str) -> Result<()>
    where
        R: MapRenderer + ?Sized,
    {
        let ids = SubLayerIds::for_layer(layer_id);
        for id in ids.layers() {
            if renderer.has_layer(id) {
                renderer.set_layer_visibility(id, Visibility::None)?;
            }
        }
        if self.click_targets.remove(&ids.polygons) {
            renderer.unbind_click(&ids.polygons)?;
        }
        Ok(())
    }
}

impl Default for LayerReconciler {
    fn default() -> Self {
        Self::new(PaintConfig::default(), RasterConfig::default())
    }
}
