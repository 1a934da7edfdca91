pub mod base;
pub mod manager;
pub mod reconciler;
pub mod vector;

// Re-export the essential types
pub use base::{BoundingBox, RasterLayer, VectorLayer};
pub use manager::LayerStore;
pub use reconciler::{LayerReconciler, ReconcileReport};
pub use vector::{PaintValue, SubLayerIds};
