use crate::{
    core::config::FitConfig,
    data::geojson::Feature,
    layers::base::BoundingBox,
};
use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Per-side padding in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Padding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

/// A camera framing command issued to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraCommand {
    /// Animate to a center at a fixed zoom
    EaseTo {
        center: Coord<f64>,
        zoom: f64,
        duration_ms: u64,
    },
    /// Frame an envelope, never zooming past `max_zoom`
    FitBounds {
        bounds: Rect<f64>,
        padding: Padding,
        max_zoom: f64,
        duration_ms: u64,
    },
}

impl CameraCommand {
    /// Bounds as `[[min_x, min_y], [max_x, max_y]]`, the renderer's wire shape
    pub fn bounds_array(&self) -> Option<[[f64; 2]; 2]> {
        match self {
            CameraCommand::FitBounds { bounds, .. } => Some([
                [bounds.min().x, bounds.min().y],
                [bounds.max().x, bounds.max().y],
            ]),
            CameraCommand::EaseTo { .. } => None,
        }
    }
}

/// Turns coordinate sets and raster boxes into camera commands
#[derive(Debug, Clone, Default)]
pub struct ViewportFitPlanner {
    config: FitConfig,
}

impl ViewportFitPlanner {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Plans framing for already normalized coordinates.
    ///
    /// No coordinates means no command; a single one is centered at a fixed
    /// zoom; two or more are framed by their envelope.
    pub fn plan_coordinates(&self, coords: &[Coord<f64>]) -> Option<CameraCommand> {
        match coords {
            [] => None,
            [single] => Some(CameraCommand::EaseTo {
                center: *single,
                zoom: self.config.single_point_zoom,
                duration_ms: self.config.duration_ms,
            }),
            [first, rest @ ..] => {
                let mut min = *first;
                let mut max = *first;
                for c in rest {
                    min.x = min.x.min(c.x);
                    min.y = min.y.min(c.y);
                    max.x = max.x.max(c.x);
                    max.y = max.y.max(c.y);
                }
                Some(CameraCommand::FitBounds {
                    bounds: Rect::new(min, max),
                    padding: Padding::uniform(self.config.feature_padding),
                    max_zoom: self.config.max_zoom,
                    duration_ms: self.config.duration_ms,
                })
            }
        }
    }

    /// Pools every leaf of every feature and plans framing for the pool
    pub fn plan_features(&self, features: &[Feature]) -> Option<CameraCommand> {
        let mut coords = Vec::new();
        for feature in features {
            if let Some(geometry) = &feature.geometry {
                geometry.collect_into(&mut coords);
            }
        }
        self.plan_coordinates(&coords)
    }

    /// Frames a raster bounding box.
    ///
    /// The corners go through `Rect::new`, so an inverted box (min above
    /// max on either axis) is reordered into its min/max envelope.
    pub fn plan_raster(&self, bbox: &BoundingBox) -> CameraCommand {
        CameraCommand::FitBounds {
            bounds: Rect::new(
                Coord {
                    x: bbox.minx,
                    y: bbox.miny,
                },
                Coord {
                    x: bbox.maxx,
                    y: bbox.maxy,
                },
            ),
            padding: Padding::uniform(self.config.raster_padding),
            max_zoom: self.config.max_zoom,
            duration_ms: self.config.duration_ms,
        }
    }
}
