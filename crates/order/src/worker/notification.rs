use crate::{
    abstract_trait::{queue::QueueDelivery, topic::DynNotificationTopic},
    domain::message::OrderNotificationMessage,
    worker::{MessageHandler, MessageOutcome},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use tracing::info;

/// Delivers order confirmations through the fan-out topic.
pub struct NotificationHandler {
    topic: DynNotificationTopic,
}

impl NotificationHandler {
    pub fn new(topic: DynNotificationTopic) -> Self {
        Self { topic }
    }
}

#[async_trait]
impl MessageHandler for NotificationHandler {
    async fn handle(&self, delivery: &QueueDelivery) -> MessageOutcome {
        let notification: OrderNotificationMessage = match serde_json::from_str(&delivery.body) {
            Ok(notification) => notification,
            Err(e) => {
                return MessageOutcome::Poison(ServiceError::Custom(format!(
                    "malformed notification payload: {e}"
                )));
            }
        };

        info!("📨 Delivering notification for order {}", notification.order_id);

        match self.topic.publish_order_confirmation(&notification).await {
            // Delivery counts only with a confirmation id; anything else is
            // retried after the visibility timeout.
            Ok(message_id) if !message_id.is_empty() => MessageOutcome::Processed,
            Ok(_) => MessageOutcome::Retry(ServiceError::Topic(
                "publish returned no message id".to_string(),
            )),
            Err(e) => MessageOutcome::Retry(e),
        }
    }
}
