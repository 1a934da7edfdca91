use futures::FutureExt;
use mapsync::prelude::*;
use serde_json::json;

/// End-to-end scenarios driving the engine against the in-memory renderer
#[cfg(test)]
mod integration_tests {
    use super::*;

    const STREETS: &str = "mapbox://styles/mapbox/streets-v11";

    fn loaded_map() -> MapSync<RecordingRenderer> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut map = MapSync::new(RecordingRenderer::new(STREETS), SyncConfig::default());
        map.renderer().emit_load();
        map.pump_signals();
        map
    }

    fn point(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point {
            coordinates: Position::new(x, y),
        })
    }

    fn line() -> Feature {
        Feature::new(Geometry::LineString {
            coordinates: vec![Position::new(0.0, 0.0), Position::new(2.0, 2.0)],
        })
    }

    fn square() -> Feature {
        Feature::new(Geometry::Polygon {
            coordinates: vec![vec![
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(1.0, 1.0),
                Position::new(0.0, 0.0),
            ]],
        })
    }

    fn layer(id: &str, features: Vec<Feature>) -> VectorLayer {
        VectorLayer::new(id, id, FeatureCollection::new(features))
    }

    fn raster_r1() -> RasterLayer {
        RasterLayer::new(
            "r1",
            "ortho",
            "https://tiles.example.com/r1/{z}/{x}/{y}.png",
            BoundingBox::new(10.0, 20.0, 12.0, 22.0),
        )
    }

    /// An unchanged layer reconciled twice creates nothing the second time
    #[test]
    fn test_reconcile_is_idempotent() {
        let mut map = loaded_map();
        let layers = vec![layer("a", vec![square(), line(), point(1.0, 1.0)])];
        map.set_vector_layers(layers.clone());
        map.set_raster_layers(vec![raster_r1()]);
        map.renderer_mut().take_calls();

        let report = map.set_vector_layers(layers).unwrap();
        assert!(report.is_noop());
        assert!(report.is_clean());
        assert_eq!(map.renderer().count_calls(RendererCall::is_create), 0);
    }

    /// Hiding a point-only layer issues one visibility call and removes nothing
    #[test]
    fn test_hiding_point_layer() {
        let mut map = loaded_map();
        map.set_vector_layers(vec![layer("a", vec![point(1.0, 1.0)])]);
        map.renderer_mut().take_calls();

        assert_eq!(map.toggle_vector("a"), Some(false));
        assert_eq!(
            map.renderer().count_calls(|c| matches!(
                c,
                RendererCall::SetVisibility {
                    visibility: Visibility::None,
                    ..
                }
            )),
            1
        );
        assert!(map.renderer().has_source("geojson-layer-a-points"));
        assert!(map.renderer().has_layer("geojson-layer-a-points"));
    }

    /// Mixed layers produce exactly their subsets with points drawn last
    #[test]
    fn test_subsets_and_z_order() {
        let mut map = loaded_map();
        map.set_raster_layers(vec![raster_r1()]);
        map.set_vector_layers(vec![
            layer("pts", vec![point(1.0, 1.0)]),
            layer("mixed", vec![square(), line()]),
        ]);

        let order = map.renderer().layer_order();
        assert_eq!(order.first(), Some(&"raster-layer-r1"));
        assert_eq!(order.last(), Some(&"geojson-layer-pts-points"));
        assert!(map.renderer().has_layer("geojson-layer-mixed-polygons"));
        assert!(map.renderer().has_layer("geojson-layer-mixed-border"));
        assert!(map.renderer().has_layer("geojson-layer-mixed-lines"));
        assert!(!map.renderer().has_layer("geojson-layer-mixed-points"));
        assert!(!map.renderer().has_layer("geojson-layer-pts-lines"));
    }

    /// A raster zoom request frames the raster's bounding box
    #[test]
    fn test_raster_zoom() {
        let mut map = loaded_map();
        map.set_raster_layers(vec![raster_r1()]);
        map.request_raster_zoom("r1");

        match map.renderer().camera() {
            Some(
                command @ CameraCommand::FitBounds {
                    padding, max_zoom, ..
                },
            ) => {
                assert_eq!(command.bounds_array(), Some([[10.0, 20.0], [12.0, 22.0]]));
                assert_eq!(*padding, Padding::uniform(10.0));
                assert_eq!(*max_zoom, 15.0);
            }
            other => panic!("expected a bounds fit, got {:?}", other),
        }
    }

    /// A multi-feature upload frames the envelope of every coordinate
    #[test]
    fn test_vector_zoom_fits_envelope() {
        let mut map = loaded_map();
        map.upload_vector(
            "roads",
            FeatureCollection::new(vec![line(), point(-1.0, 3.0)]),
        );
        match map.renderer().camera() {
            Some(command @ CameraCommand::FitBounds { padding, .. }) => {
                assert_eq!(command.bounds_array(), Some([[-1.0, 0.0], [2.0, 3.0]]));
                assert_eq!(*padding, Padding::uniform(50.0));
            }
            other => panic!("expected a bounds fit, got {:?}", other),
        }
    }

    /// Projected coordinates are framed in degrees
    #[test]
    fn test_projected_upload_is_normalized() {
        let mut map = loaded_map();
        map.upload_vector(
            "projected",
            FeatureCollection::new(vec![point(1_113_194.9079327357, 0.0)]),
        );
        match map.renderer().camera() {
            Some(CameraCommand::EaseTo { center, zoom, .. }) => {
                assert!((center.x - 10.0).abs() < 1e-6);
                assert!(center.y.abs() < 1e-9);
                assert_eq!(*zoom, 13.0);
            }
            other => panic!("expected an ease, got {:?}", other),
        }
    }

    /// A zoom request for a layer that does not exist yet is dropped
    #[test]
    fn test_early_zoom_request_is_dropped() {
        let mut map = loaded_map();
        map.request_raster_zoom("r1");
        map.set_raster_layers(vec![raster_r1()]);
        map.process_zoom_requests();
        assert!(map.renderer().camera().is_none());
    }

    /// Clicking a polygon shows its area with two decimals
    #[test]
    fn test_area_popup() {
        let mut map = loaded_map();
        let parcel = square().with_property("area", json!(12.345));
        map.set_vector_layers(vec![layer("p", vec![parcel])]);

        map.renderer()
            .click("geojson-layer-p-polygons", Coord { x: 0.5, y: 0.5 });
        map.pump_signals();

        let popup = map.renderer().popups().last().cloned().unwrap();
        assert_eq!(popup.text, "12.35 m²");
        assert_eq!(popup.position, Coord { x: 0.5, y: 0.5 });
        assert_eq!(popup.offset, (0.0, -10.0));
        assert!(popup.close_button);
    }

    /// A polygon without a numeric area shows the placeholder
    #[test]
    fn test_area_popup_fallback() {
        let mut map = loaded_map();
        let parcel = square().with_property("area", json!("unknown"));
        map.set_vector_layers(vec![layer("p", vec![parcel])]);

        map.renderer()
            .click("geojson-layer-p-polygons", Coord { x: 0.5, y: 0.5 });
        map.pump_signals();
        assert_eq!(
            map.popup().map(|p| p.text.as_str()),
            Some("Area's information not available")
        );
    }

    /// A theme swap wipes the renderer and the replay restores every layer
    #[test]
    fn test_theme_swap_replays_layers() {
        let mut map = loaded_map();
        map.set_raster_layers(vec![raster_r1()]);
        map.set_vector_layers(vec![layer("a", vec![square(), point(1.0, 1.0)])]);
        let before: Vec<String> = map
            .renderer()
            .layer_order()
            .into_iter()
            .map(String::from)
            .collect();

        let mut replay = map.change_theme("dark-v10").unwrap();
        assert!(map.renderer().layer_order().is_empty());
        assert!((&mut replay).now_or_never().is_none());

        // changes made while the style loads are folded into the replay
        assert!(map.set_vector_visible("a", false));
        assert!(map.renderer().layer_order().is_empty());

        map.renderer().finish_style_load();
        map.pump_signals();

        let report = replay.now_or_never().unwrap().unwrap();
        assert_eq!(report.created_layers, before.len());
        assert_eq!(map.renderer().layer_order(), before);
        assert_eq!(map.renderer().style(), "mapbox://styles/mapbox/dark-v10");
        assert_eq!(
            map.renderer()
                .layer("geojson-layer-a-points")
                .map(|l| l.visibility),
            Some(Visibility::None)
        );
        assert_eq!(map.renderer().click_bindings().len(), 1);
    }

    /// Only the most recent theme swap replays
    #[test]
    fn test_superseded_theme_swap() {
        let mut map = loaded_map();
        map.set_vector_layers(vec![layer("a", vec![point(1.0, 1.0)])]);

        let first = map.change_theme("light-v10").unwrap();
        let second = map.change_theme("satellite-v9").unwrap();
        assert!(matches!(first.now_or_never(), Some(Err(_))));

        map.renderer()
            .emit(RendererSignal::StyleReady {
                style: "mapbox://styles/mapbox/light-v10".to_string(),
            });
        map.pump_signals();
        assert!(map.is_style_pending());
        assert!(map.renderer().layer_order().is_empty());

        map.renderer().finish_style_load();
        map.pump_signals();
        assert!(second.now_or_never().unwrap().is_ok());
        assert_eq!(map.current_theme(), "satellite-v9");
        assert!(map.renderer().has_layer("geojson-layer-a-points"));
    }

    #[test]
    fn test_unknown_theme() {
        let mut map = loaded_map();
        assert!(matches!(
            map.change_theme("neon-v1"),
            Err(MapSyncError::UnknownTheme(_))
        ));
        assert!(!map.is_style_pending());
    }

    /// Deleting keeps the local removal even when the backend refuses
    #[tokio::test]
    async fn test_delete_survives_backend_failure() {
        let mut map = loaded_map();
        let id = map.upload_vector("parcels", FeatureCollection::new(vec![square()]));
        let backend = MemoryBackend::default().rejecting_deletes();

        let removed = map.delete_vector_layer(&id, &backend).await;
        assert_eq!(removed.map(|l| l.name), Some("parcels".to_string()));
        assert!(map.store().vectors().is_empty());

        let fill = map
            .renderer()
            .layer(&format!("geojson-layer-{}-polygons", id))
            .unwrap();
        assert_eq!(fill.visibility, Visibility::None);
    }

    /// Refreshing pulls both lists and keeps a list whose fetch fails
    #[tokio::test]
    async fn test_refresh_from_backend() {
        let mut map = loaded_map();
        let backend = MemoryBackend::new(vec![layer("remote", vec![line()])], vec![raster_r1()]);
        let report = map.refresh_from(&backend).await.unwrap();
        assert_eq!(report.created_sources, 2);
        assert!(map.renderer().has_layer("geojson-layer-remote-lines"));
        assert!(map.renderer().has_layer("raster-layer-r1"));

        let offline = MemoryBackend::default().offline();
        map.refresh_from(&offline).await;
        assert_eq!(map.store().vectors().len(), 1);
        assert_eq!(map.store().rasters().len(), 1);
    }

    /// The engine works through a boxed renderer picked at runtime
    #[test]
    fn test_boxed_renderer() {
        let renderer: Box<dyn MapRenderer> = Box::new(RecordingRenderer::new(STREETS));
        let mut map = MapSync::new(renderer, SyncConfig::default());
        map.handle_signal(RendererSignal::Load);
        map.set_vector_layers(vec![layer("a", vec![point(0.0, 0.0)])]);
        assert!(map.renderer().has_layer("geojson-layer-a-points"));
    }
}
