//! Store change notifications
//!
//! Stores publish a [`StoreEvent`] after every committed mutation so views can
//! refresh. Publishing never blocks and never fails the mutation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast channel capacity per store
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Entity touched by a mutation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Subscriber,
    Tag,
    Casting,
    Plan,
    Promotion,
    Video,
    Sale,
    Project,
}

/// What happened to the entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreEvent {
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub id: i64,
    pub timestamp: i64,
}

impl StoreEvent {
    pub fn new(entity: EntityKind, action: ChangeAction, id: i64) -> Self {
        Self {
            entity,
            action,
            id,
            timestamp: shared::util::now_millis(),
        }
    }
}

/// Thin wrapper over a broadcast sender
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, entity: EntityKind, action: ChangeAction, id: i64) {
        // No receivers is the normal case outside of a running view
        let _ = self.tx.send(StoreEvent::new(entity, action, id));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_receivers_is_fine() {
        let bus = EventBus::new();
        bus.publish(EntityKind::Sale, ChangeAction::Created, 1);
    }

    #[test]
    fn receivers_get_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(EntityKind::Tag, ChangeAction::Created, 1);
        bus.publish(EntityKind::Tag, ChangeAction::Deleted, 1);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.entity, EntityKind::Tag);
        assert_eq!(first.action, ChangeAction::Created);
        assert_eq!(rx.try_recv().unwrap().action, ChangeAction::Deleted);
    }
}
