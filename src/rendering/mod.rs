pub mod recording;
pub mod renderer;

// Re-export main types
pub use recording::{RecordingRenderer, RendererCall};
pub use renderer::{LayerKind, LayerSpec, MapRenderer, Paint, SourceDescriptor, Visibility};
