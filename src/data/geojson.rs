use crate::core::geo::normalize;
use geo_types::Coord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One coordinate leaf as it appears in the source document.
///
/// Leaves are kept as raw JSON so that a malformed pair only drops itself
/// instead of failing the whole feature collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub Value);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(serde_json::json!([x, y]))
    }

    /// The leaf as a numeric pair, ignoring any altitude member
    pub fn pair(&self) -> Option<Coord<f64>> {
        let items = self.0.as_array()?;
        if items.len() < 2 {
            return None;
        }
        Some(Coord {
            x: items[0].as_f64()?,
            y: items[1].as_f64()?,
        })
    }
}

impl From<[f64; 2]> for Position {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// GeoJSON geometry types
///
/// Every nesting level above the leaves is lenient: a `null` or non-array
/// `coordinates`, ring or polygon reads as empty instead of failing the
/// whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        #[serde(default)]
        coordinates: Position,
    },
    LineString {
        #[serde(default, deserialize_with = "lenient_positions")]
        coordinates: Vec<Position>,
    },
    Polygon {
        #[serde(default, deserialize_with = "lenient_rings")]
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        #[serde(default, deserialize_with = "lenient_positions")]
        coordinates: Vec<Position>,
    },
    MultiLineString {
        #[serde(default, deserialize_with = "lenient_rings")]
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        #[serde(default, deserialize_with = "lenient_polygons")]
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    /// GeometryCollection and anything else the engine does not render
    #[serde(other)]
    Unsupported,
}

fn positions_of(value: Value) -> Vec<Position> {
    match value {
        Value::Array(items) => items.into_iter().map(Position).collect(),
        _ => Vec::new(),
    }
}

fn rings_of(value: Value) -> Vec<Vec<Position>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_array)
            .map(positions_of)
            .collect(),
        _ => Vec::new(),
    }
}

fn polygons_of(value: Value) -> Vec<Vec<Vec<Position>>> {
    match value {
        Value::Array(items) => items.into_iter().filter(Value::is_array).map(rings_of).collect(),
        _ => Vec::new(),
    }
}

fn lenient_positions<'de, D>(deserializer: D) -> std::result::Result<Vec<Position>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(positions_of(Value::deserialize(deserializer)?))
}

fn lenient_rings<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<Position>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(rings_of(Value::deserialize(deserializer)?))
}

fn lenient_polygons<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Vec<Vec<Position>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(polygons_of(Value::deserialize(deserializer)?))
}

/// Rendering class a geometry is partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryClass {
    Polygon,
    Line,
    Point,
}

impl Geometry {
    /// The sub-layer class this geometry renders in.
    ///
    /// MultiPoint has no class: the renderer only draws single points as
    /// circles, so MultiPoint features are not rendered at all.
    pub fn class(&self) -> Option<GeometryClass> {
        match self {
            Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => {
                Some(GeometryClass::Polygon)
            }
            Geometry::LineString { .. } | Geometry::MultiLineString { .. } => {
                Some(GeometryClass::Line)
            }
            Geometry::Point { .. } => Some(GeometryClass::Point),
            Geometry::MultiPoint { .. } | Geometry::Unsupported => None,
        }
    }

    /// Appends every well-formed leaf, normalized to degrees, in traversal order
    pub fn collect_into(&self, out: &mut Vec<Coord<f64>>) {
        match self {
            Geometry::Point { coordinates } => push_position(coordinates, out),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                push_positions(coordinates, out)
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                push_rings(coordinates, out)
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    push_rings(polygon, out);
                }
            }
            Geometry::Unsupported => {}
        }
    }

    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }
}

fn push_position(position: &Position, out: &mut Vec<Coord<f64>>) {
    if let Some(pair) = position.pair() {
        out.push(normalize(pair));
    }
}

fn push_positions(positions: &[Position], out: &mut Vec<Coord<f64>>) {
    for position in positions {
        push_position(position, out);
    }
}

fn push_rings(rings: &[Vec<Position>], out: &mut Vec<Coord<f64>>) {
    for ring in rings {
        push_positions(ring, out);
    }
}

/// Flattens an optional geometry into normalized coordinates.
///
/// A missing geometry yields an empty sequence.
pub fn collect_coordinates(geometry: Option<&Geometry>) -> Vec<Coord<f64>> {
    geometry.map(Geometry::coordinates).unwrap_or_default()
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: None,
        }
    }

    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// Reads a property as a number, accepting numeric strings
    pub fn numeric_property(&self, key: &str) -> Option<f64> {
        match self.property(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<GeometryClass> {
        self.geometry.as_ref().and_then(Geometry::class)
    }
}

/// Root GeoJSON collection the layers carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features of one rendering class, in their original order
    pub fn of_class(&self, class: GeometryClass) -> FeatureCollection {
        FeatureCollection::new(
            self.features
                .iter()
                .filter(|f| f.class() == Some(class))
                .cloned()
                .collect(),
        )
    }

    /// Every normalized leaf of every feature, pooled in feature order
    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        let mut out = Vec::new();
        for feature in &self.features {
            if let Some(geometry) = &feature.geometry {
                geometry.collect_into(&mut out);
            }
        }
        out
    }
}

/// Parses an uploaded `.geojson` document.
///
/// A bare `Feature` is wrapped into a one-element collection.
pub fn parse_feature_collection(geojson_str: &str) -> crate::Result<FeatureCollection> {
    let value: Value = serde_json::from_str(geojson_str)?;
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => Ok(serde_json::from_value(value)?),
        Some("Feature") => Ok(FeatureCollection::new(vec![serde_json::from_value(value)?])),
        Some(other) => Err(crate::Error::InvalidGeoJson(format!(
            "expected a Feature or FeatureCollection, found {}",
            other
        ))),
        None => Err(crate::Error::InvalidGeoJson(
            "missing `type` member".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(ring: &[[f64; 2]]) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![ring.iter().copied().map(Position::from).collect()],
        }
    }

    #[test]
    fn test_polygon_ring_yields_each_leaf_in_order() {
        let ring = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let coords = polygon(&ring).coordinates();
        assert_eq!(coords.len(), 4);
        for (got, want) in coords.iter().zip(ring.iter()) {
            assert_eq!(got.x, want[0]);
            assert_eq!(got.y, want[1]);
        }
    }

    #[test]
    fn test_projected_leaves_are_normalized() {
        let line = Geometry::LineString {
            coordinates: vec![Position::new(1_113_194.9, 1_118_889.9), Position::new(10.0, 10.0)],
        };
        let coords = line.coordinates();
        assert_eq!(coords.len(), 2);
        assert!((coords[0].x - 10.0).abs() < 1e-3);
        assert!((coords[0].y - 10.0).abs() < 1e-3);
        assert_eq!(coords[1], Coord { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_malformed_leaves_are_skipped() {
        let json = r#"{
            "type": "LineString",
            "coordinates": [[1, 2], ["a", 3], [4], null, [5, 6, 100]]
        }"#;
        let geometry: Geometry = serde_json::from_str(json).unwrap();
        let coords = geometry.coordinates();
        assert_eq!(coords, vec![Coord { x: 1.0, y: 2.0 }, Coord { x: 5.0, y: 6.0 }]);
    }

    #[test]
    fn test_null_coordinates_read_as_empty() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": null}},
                {"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": "junk"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3, 4]}}
            ]
        }"#;
        let collection = parse_feature_collection(json).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::LineString { coordinates: vec![] })
        );
        assert_eq!(collection.coordinates(), vec![Coord { x: 3.0, y: 4.0 }]);
    }

    #[test]
    fn test_non_array_rings_are_skipped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]], "junk", null]}},
                {"type": "Feature", "geometry": {"type": "MultiPolygon",
                    "coordinates": [7, [[[5, 5], [6, 5], [6, 6]], {}]]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [9, 9]}}
            ]
        }"#;
        let collection = parse_feature_collection(json).unwrap();
        assert_eq!(collection.features[0].geometry.as_ref().map(|g| g.coordinates().len()), Some(4));
        assert_eq!(collection.features[1].geometry.as_ref().map(|g| g.coordinates().len()), Some(3));
        assert_eq!(collection.of_class(GeometryClass::Point).len(), 1);
        assert_eq!(collection.coordinates().len(), 8);
    }

    #[test]
    fn test_missing_geometry_is_empty() {
        assert!(collect_coordinates(None).is_empty());
        let feature: Feature =
            serde_json::from_str(r#"{"type":"Feature","geometry":null,"properties":null}"#).unwrap();
        assert!(collect_coordinates(feature.geometry.as_ref()).is_empty());
    }

    #[test]
    fn test_multipolygon_depth() {
        let json = r#"{
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 5]], [[5.2, 5.2], [5.4, 5.2], [5.2, 5.4]]]
            ]
        }"#;
        let geometry: Geometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.coordinates().len(), 11);
        assert_eq!(geometry.class(), Some(GeometryClass::Polygon));
    }

    #[test]
    fn test_geometry_classes() {
        let point = Geometry::Point {
            coordinates: Position::new(1.0, 2.0),
        };
        let multi_point = Geometry::MultiPoint {
            coordinates: vec![Position::new(1.0, 2.0)],
        };
        let line = Geometry::MultiLineString { coordinates: vec![] };
        assert_eq!(point.class(), Some(GeometryClass::Point));
        assert_eq!(multi_point.class(), None);
        assert_eq!(line.class(), Some(GeometryClass::Line));
    }

    #[test]
    fn test_unknown_geometry_type_is_unsupported() {
        let json = r#"{"type":"GeometryCollection","geometries":[]}"#;
        let geometry: Geometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry, Geometry::Unsupported);
        assert!(geometry.coordinates().is_empty());
    }

    #[test]
    fn test_parse_feature_collection() {
        let geojson_str = r#"
        {
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"area": 12.5},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Test Point"},
                    "geometry": {"type": "Point", "coordinates": [-74.0060, 40.7128]}
                }
            ]
        }
        "#;
        let collection = parse_feature_collection(geojson_str).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.of_class(GeometryClass::Polygon).len(), 1);
        assert_eq!(collection.of_class(GeometryClass::Point).len(), 1);
        assert_eq!(collection.of_class(GeometryClass::Line).len(), 0);
        assert_eq!(collection.features[0].numeric_property("area"), Some(12.5));
    }

    #[test]
    fn test_parse_single_feature_and_rejects_geometry() {
        let feature = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]}}"#;
        assert_eq!(parse_feature_collection(feature).unwrap().len(), 1);

        let bare = r#"{"type":"Point","coordinates":[1,2]}"#;
        assert!(matches!(
            parse_feature_collection(bare),
            Err(crate::Error::InvalidGeoJson(_))
        ));
    }

    #[test]
    fn test_numeric_property_accepts_strings() {
        let feature = Feature::default()
            .with_property("area", serde_json::json!(" 42.5 "))
            .with_property("label", serde_json::json!("big"));
        assert_eq!(feature.numeric_property("area"), Some(42.5));
        assert_eq!(feature.numeric_property("label"), None);
        assert_eq!(feature.numeric_property("missing"), None);
    }

    #[test]
    fn test_collection_serializes_with_type_tags() {
        let collection = FeatureCollection::new(vec![Feature::new(Geometry::Point {
            coordinates: Position::new(1.0, 2.0),
        })]);
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
    }
}
