use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Events published by the inventory check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A product's stock is at or below its reorder point
    ReorderRecommended {
        product_id: Uuid,
        product_name: String,
        current_stock: i64,
        reorder_point: f64,
        recommended_order_quantity: f64,
        projected_stockout_days: Option<f64>,
    },
    /// A check finished; `flagged` counts the reorder alerts it sent
    InventoryCheckCompleted {
        checked: usize,
        flagged: usize,
        as_of: DateTime<Utc>,
    },
    /// The forecast behind a check failed
    InventoryCheckFailed {
        reason: String,
        as_of: DateTime<Utc>,
    },
}

/// Drains the event channel, logging each alert until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::ReorderRecommended {
                product_id,
                product_name,
                current_stock,
                reorder_point,
                recommended_order_quantity,
                projected_stockout_days,
            } => {
                warn!(
                    product_id = %product_id,
                    product = %product_name,
                    current_stock,
                    reorder_point,
                    recommended_order_quantity,
                    projected_stockout_days = ?projected_stockout_days,
                    "Reorder recommended"
                );
            }
            Event::InventoryCheckCompleted {
                checked,
                flagged,
                as_of,
            } => {
                info!(checked, flagged, as_of = %as_of, "Inventory check completed");
            }
            Event::InventoryCheckFailed { reason, as_of } => {
                error!(as_of = %as_of, "Inventory check failed: {}", reason);
            }
        }
    }

    info!("Event channel closed; event processor stopping");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender
            .send(Event::InventoryCheckFailed {
                reason: "db down".into(),
                as_of: Utc::now(),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn processor_exits_when_senders_drop() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::InventoryCheckCompleted {
                checked: 3,
                flagged: 1,
                as_of: Utc::now(),
            })
            .await
            .unwrap();
        drop(sender);

        tokio::time::timeout(std::time::Duration::from_secs(1), process_events(rx))
            .await
            .expect("processor should stop when the channel closes");
    }
}
