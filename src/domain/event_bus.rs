//! Per-controller broadcast of lifecycle events.

use chrono::Utc;
use tokio::sync::broadcast;

use super::{ControllerId, ListEvent, ListEventKind};

/// Broadcast bus owned by one controller.
///
/// [`EventBus::emit`] stamps each [`ListEventKind`] with the owning
/// controller's id and the current time. Lagging receivers lose the
/// oldest events; emitting never waits on observers.
#[derive(Debug)]
pub struct EventBus {
    controller_id: ControllerId,
    sender: broadcast::Sender<ListEvent>,
}

impl EventBus {
    /// Creates a bus for `controller_id` holding up to `capacity` unread events.
    #[must_use]
    pub fn new(controller_id: ControllerId, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            controller_id,
            sender,
        }
    }

    /// Publishes `kind` and returns how many receivers got it.
    pub fn emit(&self, kind: ListEventKind) -> usize {
        self.sender
            .send(ListEvent {
                controller_id: self.controller_id,
                timestamp: Utc::now(),
                kind,
            })
            .unwrap_or(0)
    }

    /// Creates a receiver for all events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_receivers_is_dropped() {
        let bus = EventBus::new(ControllerId::new(), 16);
        assert_eq!(bus.emit(ListEventKind::Cleaned), 0);
    }

    #[tokio::test]
    async fn emitted_events_carry_the_owner() {
        let id = ControllerId::new();
        let bus = EventBus::new(id, 16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.emit(ListEventKind::RowsPatched { rows: 2 }), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.controller_id, id);
        assert_eq!(e2.kind, ListEventKind::RowsPatched { rows: 2 });
        assert_eq!(e1.timestamp, e2.timestamp);
    }

    #[test]
    fn lagging_receiver_keeps_newest() {
        let bus = EventBus::new(ControllerId::new(), 2);
        let mut rx = bus.subscribe();
        for rows in 1..=3 {
            let _ = bus.emit(ListEventKind::RowsPatched { rows });
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        let Ok(event) = rx.try_recv() else {
            panic!("expected the second event");
        };
        assert_eq!(event.kind, ListEventKind::RowsPatched { rows: 2 });
    }
}
