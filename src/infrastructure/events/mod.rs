//! Event bus for decoupled communication
//!
//! Replay and sharing publish typed events here instead of talking to the
//! presentation layer directly; consumers subscribe and decide what to
//! re-render or re-derive.

use crate::ledger::ChangeRecord;
use crate::store::Partition;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Store and sharing lifecycle events
#[derive(Debug, Clone)]
pub enum Event {
    /// Core has started
    CoreStarted,

    /// Core is shutting down
    CoreShutdown,

    /// A partition's history changed. `records` can be empty: a share can
    /// change the partition's structure without a single entity mutation, and
    /// observers are expected to re-derive their summary state anyway.
    StoreChanged {
        partition: Partition,
        records: Vec<ChangeRecord>,
    },

    /// Activity or an error reported by the remote sync collaborator, or a
    /// replay failure that will be retried on the next remote change signal.
    SyncActivity {
        partition: Option<Partition>,
        error: Option<String>,
    },

    /// A new share was created around an entity subgraph
    ShareCreated { share_id: Uuid, zone_id: Uuid },

    /// A share's zone and everything in it was removed
    SharePurged { zone_id: Uuid },
}

/// Event bus for broadcasting events
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event
    pub fn emit(&self, event: Event) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
