//! Renderer ids and paint of the sub-layers a vector layer is split into.

use crate::{
    core::{config::PaintConfig, constants::VECTOR_LAYER_PREFIX},
    rendering::renderer::{LayerKind, Paint},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A single paint property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaintValue {
    Number(f64),
    Color(String),
    /// A renderer style expression such as `["interpolate", ...]`
    Expression(Value),
}

impl PaintValue {
    pub fn to_json(&self) -> Value {
        match self {
            PaintValue::Number(n) => json!(n),
            PaintValue::Color(c) => json!(c),
            PaintValue::Expression(e) => e.clone(),
        }
    }
}

/// Renderer ids derived from one logical vector layer id.
///
/// The polygon fill and its border share the `polygons` source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerIds {
    pub polygons: String,
    pub border: String,
    pub lines: String,
    pub points: String,
}

impl SubLayerIds {
    pub fn for_layer(layer_id: &str) -> Self {
        let base = format!("{}{}", VECTOR_LAYER_PREFIX, layer_id);
        Self {
            polygons: format!("{}-polygons", base),
            border: format!("{}-border", base),
            lines: format!("{}-lines", base),
            points: format!("{}-points", base),
        }
    }

    /// All renderer layer ids, bottom to top
    pub fn layers(&self) -> [&str; 4] {
        [
            self.polygons.as_str(),
            self.border.as_str(),
            self.lines.as_str(),
            self.points.as_str(),
        ]
    }
}

/// Declarative description of one sub-layer of a subset
#[derive(Debug, Clone, PartialEq)]
pub struct SubLayerPlan {
    pub id: String,
    pub kind: LayerKind,
    pub paint: Paint,
}

pub fn fill_paint(config: &PaintConfig) -> Paint {
    vec![
        ("fill-color", PaintValue::Color(config.fill_color.clone())),
        ("fill-opacity", PaintValue::Number(config.fill_opacity)),
    ]
}

pub fn border_paint(config: &PaintConfig) -> Paint {
    vec![
        ("line-color", PaintValue::Color(config.border_color.clone())),
        ("line-width", PaintValue::Number(config.border_width)),
    ]
}

pub fn line_paint(config: &PaintConfig) -> Paint {
    vec![
        ("line-color", PaintValue::Color(config.line_color.clone())),
        ("line-width", PaintValue::Number(config.line_width)),
    ]
}

pub fn point_paint(config: &PaintConfig) -> Paint {
    vec![
        ("circle-color", PaintValue::Color(config.point_color.clone())),
        ("circle-opacity", PaintValue::Number(config.point_opacity)),
        (
            "circle-stroke-color",
            PaintValue::Color(config.point_stroke_color.clone()),
        ),
        (
            "circle-stroke-width",
            PaintValue::Number(config.point_stroke_width),
        ),
        ("circle-radius", radius_expression(&config.point_radius_stops)),
    ]
}

/// `["interpolate", ["linear"], ["zoom"], z0, r0, z1, r1, ...]`
pub fn radius_expression(stops: &[(f64, f64)]) -> PaintValue {
    let mut expression = vec![json!("interpolate"), json!(["linear"]), json!(["zoom"])];
    for (zoom, radius) in stops {
        expression.push(json!(zoom));
        expression.push(json!(radius));
    }
    PaintValue::Expression(Value::Array(expression))
}

/// Sub-layers of the polygon subset: fill below its border
pub fn polygon_plans(ids: &SubLayerIds, config: &PaintConfig) -> Vec<SubLayerPlan> {
    vec![
        SubLayerPlan {
            id: ids.polygons.clone(),
            kind: LayerKind::Fill,
            paint: fill_paint(config),
        },
        SubLayerPlan {
            id: ids.border.clone(),
            kind: LayerKind::Line,
            paint: border_paint(config),
        },
    ]
}

pub fn line_plans(ids: &SubLayerIds, config: &PaintConfig) -> Vec<SubLayerPlan> {
    vec![SubLayerPlan {
        id: ids.lines.clone(),
        kind: LayerKind::Line,
        paint: line_paint(config),
    }]
}

pub fn point_plans(ids: &SubLayerIds, config: &PaintConfig) -> Vec<SubLayerPlan> {
    vec![SubLayerPlan {
        id: ids.points.clone(),
        kind: LayerKind::Circle,
        paint: point_paint(config),
    }]
}
