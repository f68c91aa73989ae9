//! Event bus for fuelboard using tokio::broadcast
//!
//! The store publishes here whenever its entry list changes, so views can
//! recompute analytics from a fresh snapshot.

use tokio::sync::broadcast;

use crate::models::EntryId;

/// Events emitted by the entry store
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    /// A new entry was recorded
    EntryAdded(EntryId),
    /// An entry was removed
    EntryDeleted(EntryId),
    /// Entries were re-read from disk by [`crate::EntryStore::reload`]
    LoadCompleted { entries: usize },
}

/// Event bus for broadcasting data events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (64 events)
    pub fn default_capacity() -> Self {
        Self::new(64)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DataEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
