//! Single-slot zoom request mailboxes.

use serde::{Deserialize, Serialize};

/// Holds at most one value; posting overwrites anything not yet taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox<T> {
    slot: Option<T>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Stores `value`, returning the unconsumed value it replaced
    pub fn post(&mut self, value: T) -> Option<T> {
        self.slot.replace(value)
    }

    /// Empties the slot
    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomKind {
    Vector,
    Raster,
}

/// A request to frame one logical layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportFitRequest {
    pub target_id: String,
    pub kind: ZoomKind,
}

impl ViewportFitRequest {
    pub fn new(target_id: impl Into<String>, kind: ZoomKind) -> Self {
        Self {
            target_id: target_id.into(),
            kind,
        }
    }
}

/// The vector and raster zoom mailboxes.
///
/// They are independent: a vector request never displaces a raster one.
#[derive(Debug, Default)]
pub struct ZoomRequestQueue {
    vector: Mailbox<ViewportFitRequest>,
    raster: Mailbox<ViewportFitRequest>,
}

impl ZoomRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_vector(&mut self, id: impl Into<String>) {
        if let Some(prev) = self.vector.post(ViewportFitRequest::new(id, ZoomKind::Vector)) {
            log::debug!("vector zoom request for {} superseded", prev.target_id);
        }
    }

    pub fn request_raster(&mut self, id: impl Into<String>) {
        if let Some(prev) = self.raster.post(ViewportFitRequest::new(id, ZoomKind::Raster)) {
            log::debug!("raster zoom request for {} superseded", prev.target_id);
        }
    }

    pub fn take_vector(&mut self) -> Option<ViewportFitRequest> {
        self.vector.take()
    }

    pub fn take_raster(&mut self) -> Option<ViewportFitRequest> {
        self.raster.take()
    }

    /// Takes both slots, vector first
    pub fn drain(&mut self) -> Vec<ViewportFitRequest> {
        self.take_vector().into_iter().chain(self.take_raster()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty() && self.raster.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_overwrites() {
        let mut mailbox = Mailbox::new();
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.post(1), None);
        assert_eq!(mailbox.post(2), Some(1));
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut queue = ZoomRequestQueue::new();
        queue.request_vector("a");
        queue.request_raster("r1");
        queue.request_vector("b");

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                ViewportFitRequest::new("b", ZoomKind::Vector),
                ViewportFitRequest::new("r1", ZoomKind::Raster),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_clears_slot() {
        let mut queue = ZoomRequestQueue::new();
        queue.request_raster("r1");
        assert_eq!(queue.take_raster().map(|r| r.target_id), Some("r1".to_string()));
        assert_eq!(queue.take_raster(), None);
        assert_eq!(queue.take_vector(), None);
    }
}
