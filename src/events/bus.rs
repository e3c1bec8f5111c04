//! Internal event broadcast — tokio::broadcast channel for cross-component events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::dialog::Lead;

/// Business events worth an admin's attention.
#[derive(Debug, Clone, Serialize)]
pub enum BotEvent {
    /// A visitor completed the application form.
    LeadSubmitted(Lead),
    /// A calculation finished, in the chat or through the web API.
    CalculationCompleted {
        source: String,
        marketplace: String,
        orders_count: i64,
        total_cost: f64,
    },
    /// The consultant failed and the user got the fallback text.
    AssistantFailed {
        chat_id: i64,
        error: String,
    },
}

/// Central event bus for broadcasting events to all subscribers.
pub struct EventBus {
    tx: broadcast::Sender<BotEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: BotEvent) {
        // No subscribers is fine: alerts are optional.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(BotEvent::AssistantFailed {
            chat_id: 7,
            error: "timeout".into(),
        });

        match rx.recv().await.unwrap() {
            BotEvent::AssistantFailed { chat_id, error } => {
                assert_eq!(chat_id, 7);
                assert_eq!(error, "timeout");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new(1).publish(BotEvent::CalculationCompleted {
            source: "web".into(),
            marketplace: "ozon".into(),
            orders_count: 1,
            total_cost: 1.0,
        });
    }
}
