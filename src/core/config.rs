//! Configuration for the sync engine
//!
//! Every literal contract of the engine (paint values, camera framing,
//! raster tiling, style URLs, popup behavior) lives here with its default
//! set to the fixed value the map is expected to show. Hosts can override
//! parts of it from JSON.

use crate::core::constants::{
    AREA_FALLBACK_TEXT, DEFAULT_THEME, FEATURE_FIT_PADDING, FIT_DURATION_MS, FIT_MAX_ZOOM,
    RASTER_FIT_PADDING, RASTER_TILE_SIZE, SINGLE_POINT_ZOOM, STYLE_URL_PREFIX,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub style: StyleConfig,
    pub fit: FitConfig,
    pub raster: RasterConfig,
    pub paint: PaintConfig,
    pub popup: PopupConfig,
}

impl SyncConfig {
    /// Parses a (possibly partial) JSON config; missing members keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.style.default_theme.trim().is_empty() {
            return Err(Error::Config("default theme must not be empty".to_string()));
        }
        if self.raster.tile_size == 0 {
            return Err(Error::Config("raster tile size must be positive".to_string()));
        }
        if self.fit.feature_padding < 0.0 || self.fit.raster_padding < 0.0 {
            return Err(Error::Config("fit padding must not be negative".to_string()));
        }
        if self.fit.max_zoom < 0.0 || self.fit.single_point_zoom < 0.0 {
            return Err(Error::Config("zoom levels must not be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Prepended to a theme value to build the style URL
    pub url_prefix: String,
    pub default_theme: String,
}

impl StyleConfig {
    pub fn style_url(&self, theme: &str) -> String {
        format!("{}{}", self.url_prefix, theme)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            url_prefix: STYLE_URL_PREFIX.to_string(),
            default_theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// Camera framing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub single_point_zoom: f64,
    pub duration_ms: u64,
    pub feature_padding: f64,
    pub raster_padding: f64,
    pub max_zoom: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            single_point_zoom: SINGLE_POINT_ZOOM,
            duration_ms: FIT_DURATION_MS,
            feature_padding: FEATURE_FIT_PADDING,
            raster_padding: RASTER_FIT_PADDING,
            max_zoom: FIT_MAX_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub tile_size: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            tile_size: RASTER_TILE_SIZE,
        }
    }
}

/// Paint values of the vector sub-layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub border_color: String,
    pub border_width: f64,
    pub line_color: String,
    pub line_width: f64,
    pub point_color: String,
    pub point_opacity: f64,
    pub point_stroke_color: String,
    pub point_stroke_width: f64,
    /// `(zoom, radius)` control points, linearly interpolated by the renderer
    pub point_radius_stops: Vec<(f64, f64)>,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            fill_color: "#22c55e".to_string(),
            fill_opacity: 0.35,
            border_color: "#16a34a".to_string(),
            border_width: 2.0,
            line_color: "#2563eb".to_string(),
            line_width: 2.0,
            point_color: "#FF3B30".to_string(),
            point_opacity: 0.95,
            point_stroke_color: "#FFFFFF".to_string(),
            point_stroke_width: 1.5,
            point_radius_stops: vec![(2.0, 3.0), (6.0, 5.0), (10.0, 7.0), (14.0, 9.0)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Pixel offset from the click location
    pub offset: (f64, f64),
    pub close_button: bool,
    pub close_on_click: bool,
    pub fallback_text: String,
    /// Drops the popup this long after it opened; `None` keeps it until a map click
    pub auto_close_ms: Option<u64>,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            offset: (0.0, -10.0),
            close_button: true,
            close_on_click: true,
            fallback_text: AREA_FALLBACK_TEXT.to_string(),
            auto_close_ms: None,
        }
    }
}
