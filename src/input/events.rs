use crate::data::geojson::Feature;
use crossbeam_channel::{unbounded, Receiver, Sender};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A click the renderer delivered for a bound layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Renderer layer the click hit
    pub layer_id: String,
    /// Click location in degrees
    pub position: Coord<f64>,
    /// Features under the cursor on that layer, topmost first
    pub features: Vec<Feature>,
}

/// Signals the renderer emits back to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RendererSignal {
    /// The map finished its initial load
    Load,
    /// A style requested through `swap_base_style` finished loading
    StyleReady { style: String },
    Click(ClickEvent),
    /// A click that hit no bound layer
    MapClick { position: Coord<f64> },
}

impl RendererSignal {
    pub fn name(&self) -> &'static str {
        match self {
            RendererSignal::Load => "load",
            RendererSignal::StyleReady { .. } => "styleready",
            RendererSignal::Click(_) => "click",
            RendererSignal::MapClick { .. } => "mapclick",
        }
    }
}

/// Unbounded signal channel between a renderer and the engine.
///
/// The renderer only ever pushes; the engine drains on its own schedule, so
/// no signal is handled while a renderer call is still on the stack.
pub struct SignalQueue {
    sender: Sender<RendererSignal>,
    receiver: Receiver<RendererSignal>,
}

impl SignalQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<RendererSignal> {
        self.sender.clone()
    }

    /// Takes every signal queued so far, oldest first
    pub fn drain(&self) -> Vec<RendererSignal> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for SignalQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let queue = SignalQueue::new();
        let sender = queue.sender();
        sender.send(RendererSignal::Load).unwrap();
        sender
            .send(RendererSignal::StyleReady {
                style: "mapbox://styles/mapbox/dark-v10".to_string(),
            })
            .unwrap();
        assert_eq!(queue.len(), 2);

        let signals = queue.drain();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].name(), "load");
        assert_eq!(signals[1].name(), "styleready");
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
