//! Change notifications for the presentation layer.
//!
//! Events are published after the store write they describe has succeeded, and
//! never for no-ops. Each event names exactly the rows that changed, so a
//! subscriber can refresh one cell on [`ChangeEvent::ImageAttached`] instead of
//! re-rendering the whole grid.

use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    PinAdded {
        pin_id: Uuid,
    },
    PinRemoved {
        pin_id: Uuid,
    },
    PhotosInserted {
        pin_id: Uuid,
        photo_ids: Vec<Uuid>,
    },
    ImageAttached {
        pin_id: Uuid,
        photo_id: Uuid,
    },
    PhotosRemoved {
        pin_id: Uuid,
        photo_ids: Vec<Uuid>,
    },
}

impl ChangeEvent {
    pub fn pin_id(&self) -> Uuid {
        match self {
            ChangeEvent::PinAdded { pin_id }
            | ChangeEvent::PinRemoved { pin_id }
            | ChangeEvent::PhotosInserted { pin_id, .. }
            | ChangeEvent::ImageAttached { pin_id, .. }
            | ChangeEvent::PhotosRemoved { pin_id, .. } => *pin_id,
        }
    }
}

/// Fan-out of [`ChangeEvent`]s. Slow subscribers lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }
}
