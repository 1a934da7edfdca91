pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod style;
pub mod viewport;
pub mod zoom;

// Re-export the essential types
pub use config::SyncConfig;
pub use geo::{classify, normalize, to_geographic, Crs};
pub use map::MapSync;
pub use style::{StyleReplay, StyleSwitchController};
pub use viewport::{CameraCommand, Padding, ViewportFitPlanner};
pub use zoom::{Mailbox, ViewportFitRequest, ZoomKind, ZoomRequestQueue};
