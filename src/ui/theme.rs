//! Basemap themes offered by the theme selector.

use crate::prelude::HashMap;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Theme {
    /// Style identifier appended to the style URL prefix
    pub value: &'static str,
    pub label: &'static str,
}

pub const THEMES: [Theme; 8] = [
    Theme { value: "streets-v11", label: "Streets" },
    Theme { value: "outdoors-v11", label: "Outdoors" },
    Theme { value: "light-v10", label: "Light" },
    Theme { value: "dark-v10", label: "Dark" },
    Theme { value: "satellite-v9", label: "Satellite" },
    Theme { value: "satellite-streets-v11", label: "Satellite Streets" },
    Theme { value: "navigation-day-v1", label: "Navigation Day" },
    Theme { value: "navigation-night-v1", label: "Navigation Night" },
];

static BY_VALUE: Lazy<HashMap<&'static str, Theme>> =
    Lazy::new(|| THEMES.iter().map(|theme| (theme.value, *theme)).collect());

impl Theme {
    pub fn all() -> &'static [Theme] {
        &THEMES
    }

    pub fn find(value: &str) -> Option<Theme> {
        BY_VALUE.get(value).copied()
    }
}
