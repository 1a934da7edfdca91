pub mod popup;
pub mod theme;

pub use popup::{area_popup, area_text, Popup};
pub use theme::{Theme, THEMES};
