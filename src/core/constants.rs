//! Engine-wide literals of the renderer contract.

/// Half the circumference of the spherical-Mercator world in meters.
pub const MERCATOR_HALF_EXTENT: f64 = 20_037_508.34;

/// Longitudes beyond this magnitude are treated as projected meters.
pub const MAX_GEOGRAPHIC_LNG: f64 = 180.0;

/// Latitudes beyond this magnitude are treated as projected meters.
pub const MAX_GEOGRAPHIC_LAT: f64 = 90.0;

/// Zoom used when framing a single coordinate.
pub const SINGLE_POINT_ZOOM: f64 = 13.0;

/// Camera animation length for every framing command.
pub const FIT_DURATION_MS: u64 = 300;

/// Padding around a vector layer extent, in pixels.
pub const FEATURE_FIT_PADDING: f64 = 50.0;

/// Per-side padding around a raster bounding box, in pixels.
pub const RASTER_FIT_PADDING: f64 = 10.0;

/// Zoom cap for bounds fits so tiny extents do not over-zoom.
pub const FIT_MAX_ZOOM: f64 = 15.0;

/// Tile size advertised for raster sources.
pub const RASTER_TILE_SIZE: u32 = 512;

/// Renderer id prefix for vector sub-layers.
pub const VECTOR_LAYER_PREFIX: &str = "geojson-layer-";

/// Renderer id prefix for raster sources and layers.
pub const RASTER_LAYER_PREFIX: &str = "raster-layer-";

/// Prefix turning a theme value into a style URL.
pub const STYLE_URL_PREFIX: &str = "mapbox://styles/mapbox/";

/// Basemap loaded before any theme change.
pub const DEFAULT_THEME: &str = "streets-v11";

/// Popup text shown when a clicked polygon carries no numeric area.
pub const AREA_FALLBACK_TEXT: &str = "Area's information not available";
