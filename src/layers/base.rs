use crate::data::geojson::FeatureCollection;
use serde::{Deserialize, Deserializer, Serialize};

fn default_visible() -> bool {
    true
}

/// A logical vector layer as uploaded by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorLayer {
    pub id: String,
    pub name: String,
    pub data: FeatureCollection,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl VectorLayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: FeatureCollection) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Geographic extent of a raster upload, as reported by the tiler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(deserialize_with = "lenient_f64")]
    pub minx: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub miny: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub maxx: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub maxy: f64,
}

impl BoundingBox {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }
}

/// The tiler reports box members either as numbers or as numeric strings
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom),
    }
}

/// A tiled raster (GeoTIFF) layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterLayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mapboxUrl", alias = "tileUrlTemplate", default)]
    pub tile_url_template: String,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl RasterLayer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tile_url_template: impl Into<String>,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tile_url_template: tile_url_template.into(),
            bounding_box: Some(bounding_box),
            visible: true,
        }
    }

    /// A raster without an id or tile URL cannot be materialized
    pub fn is_renderable(&self) -> bool {
        !self.id.is_empty() && !self.tile_url_template.is_empty()
    }
}
