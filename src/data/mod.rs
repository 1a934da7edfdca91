pub mod backend;
pub mod geojson;

pub use backend::{HttpLayerBackend, LayerBackend, MemoryBackend};
pub use geojson::{
    collect_coordinates, parse_feature_collection, Feature, FeatureCollection, Geometry,
    GeometryClass, Position,
};
