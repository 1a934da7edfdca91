use crate::core::constants::{MAX_GEOGRAPHIC_LAT, MAX_GEOGRAPHIC_LNG, MERCATOR_HALF_EXTENT};
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The two coordinate reference systems the engine tells apart.
///
/// There is no declared projection tag on incoming data; the system is
/// inferred from the numeric range of each pair (see [`classify`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Longitude/latitude in degrees (EPSG:4326).
    Geographic,
    /// Spherical-Mercator meters (EPSG:3857).
    Projected,
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Geographic => write!(f, "EPSG:4326"),
            Crs::Projected => write!(f, "EPSG:3857"),
        }
    }
}

/// Classifies a pair as projected when it cannot be a valid lng/lat
pub fn classify(coord: Coord<f64>) -> Crs {
    if coord.x.abs() > MAX_GEOGRAPHIC_LNG || coord.y.abs() > MAX_GEOGRAPHIC_LAT {
        Crs::Projected
    } else {
        Crs::Geographic
    }
}

/// Inverse spherical-Mercator transform, meters to degrees.
pub fn to_geographic(coord: Coord<f64>) -> Coord<f64> {
    let lng = coord.x * 180.0 / MERCATOR_HALF_EXTENT;
    let lat0 = coord.y * 180.0 / MERCATOR_HALF_EXTENT;
    let lat = (lat0 * PI / 180.0).exp().atan() * 360.0 / PI - 90.0;
    Coord { x: lng, y: lat }
}

/// Converts projected pairs to degrees and passes geographic pairs through.
pub fn normalize(coord: Coord<f64>) -> Coord<f64> {
    match classify(coord) {
        Crs::Projected => to_geographic(coord),
        Crs::Geographic => coord,
    }
}
