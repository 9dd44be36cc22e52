use crate::domain::MapEvent;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out of [`MapEvent`]s to every connected map UI.
///
/// Subscribers only see events emitted after they subscribed. A slow
/// subscriber that falls more than `capacity` events behind loses the
/// oldest ones.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MapEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.tx.subscribe()
    }

    /// Publishes `event`; having no subscriber is not an error.
    pub fn emit(&self, event: MapEvent) {
        tracing::debug!(event = event.event_type(), "Emitting map event");
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(MapEvent::InteractionChanged { enabled: false });
        bus.emit(MapEvent::MarkerRemoved {
            product_id: ProductId::new("abc123"),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            MapEvent::InteractionChanged { enabled: false }
        );
        assert_eq!(rx.recv().await.unwrap().event_type(), "MarkerRemoved");
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.emit(MapEvent::InteractionChanged { enabled: true });
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), DEFAULT_EVENT_CAPACITY);
    }
}
