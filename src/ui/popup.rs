use crate::{core::config::PopupConfig, data::geojson::Feature};
use geo_types::Coord;
use instant::Instant;
use std::time::Duration;

/// A transient popup anchored at a map location
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: String,
    pub position: Coord<f64>,
    pub title: String,
    pub text: String,
    pub close_button: bool,
    pub close_on_click: bool,
    /// Pixel offset from `position`
    pub offset: (f64, f64),
    pub created_at: Instant,
    pub auto_close_duration: Option<Duration>,
}

impl Popup {
    pub fn new(id: String, position: Coord<f64>, text: String) -> Self {
        Self {
            id,
            position,
            title: String::new(),
            text,
            close_button: true,
            close_on_click: true,
            offset: (0.0, 0.0),
            created_at: Instant::now(),
            auto_close_duration: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_config(mut self, config: &PopupConfig) -> Self {
        self.close_button = config.close_button;
        self.close_on_click = config.close_on_click;
        self.offset = config.offset;
        self.auto_close_duration = config.auto_close_ms.map(Duration::from_millis);
        self
    }

    pub fn should_auto_close(&self) -> bool {
        if let Some(duration) = self.auto_close_duration {
            self.created_at.elapsed() > duration
        } else {
            false
        }
    }
}

/// Text shown for a clicked polygon: its `area` with two decimals, or the fallback
pub fn area_text(feature: &Feature, fallback: &str) -> String {
    match feature.numeric_property("area") {
        Some(area) => format!("{:.2} m²", area),
        None => fallback.to_string(),
    }
}

/// Builds the area popup for a polygon click
pub fn area_popup(
    layer_id: &str,
    feature: &Feature,
    position: Coord<f64>,
    config: &PopupConfig,
) -> Popup {
    Popup::new(
        format!("{}-area", layer_id),
        position,
        area_text(feature, &config.fallback_text),
    )
    .with_title("Area")
    .with_config(config)
}
