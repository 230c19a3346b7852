use crate::{
    abstract_trait::{
        order::repository::DynOrderCommandRepository,
        queue::{DynOrderQueue, QueueDelivery},
    },
    domain::message::{OrderNotificationMessage, OrderProcessingMessage},
    model::OrderStatus,
    worker::{MessageHandler, MessageOutcome},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use tracing::info;

/// Advances freshly created orders to `Processing` and forwards a
/// notification request for each one.
pub struct ProcessingHandler {
    command: DynOrderCommandRepository,
    queue: DynOrderQueue,
}

impl ProcessingHandler {
    pub fn new(command: DynOrderCommandRepository, queue: DynOrderQueue) -> Self {
        Self { command, queue }
    }
}

#[async_trait]
impl MessageHandler for ProcessingHandler {
    async fn handle(&self, delivery: &QueueDelivery) -> MessageOutcome {
        let message: OrderProcessingMessage = match serde_json::from_str(&delivery.body) {
            Ok(message) => message,
            Err(e) => {
                return MessageOutcome::Poison(ServiceError::Custom(format!(
                    "malformed processing payload: {e}"
                )));
            }
        };

        info!("⚙️ Processing order {}", message.order_id);

        // Idempotent: a redelivered message sets the same status again.
        if let Err(e) = self
            .command
            .update_status(&message.order_id, OrderStatus::Processing)
            .await
        {
            return MessageOutcome::Retry(ServiceError::Repo(e));
        }

        let notification = OrderNotificationMessage::from_processing(&message);

        if let Err(e) = self.queue.send_order_notification(&notification).await {
            return MessageOutcome::Retry(e);
        }

        MessageOutcome::Processed
    }
}
