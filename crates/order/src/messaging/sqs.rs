use crate::{
    abstract_trait::queue::{OrderQueueTrait, QueueDelivery, QueueKind},
    domain::message::{OrderNotificationMessage, OrderProcessingMessage},
};
use async_trait::async_trait;
use aws_sdk_sqs::{Client, types::MessageAttributeValue};
use shared::errors::ServiceError;
use tracing::info;

const MAX_BATCH_SIZE: i32 = 10;
const LONG_POLL_SECONDS: i32 = 20;

pub struct SqsOrderQueue {
    client: Client,
    processing_queue_url: String,
    notification_queue_url: String,
}

impl SqsOrderQueue {
    pub fn new(
        client: Client,
        processing_queue_url: impl Into<String>,
        notification_queue_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            processing_queue_url: processing_queue_url.into(),
            notification_queue_url: notification_queue_url.into(),
        }
    }

    fn queue_url(&self, kind: QueueKind) -> &str {
        match kind {
            QueueKind::Processing => &self.processing_queue_url,
            QueueKind::Notification => &self.notification_queue_url,
        }
    }

    fn string_attribute(value: &str) -> Result<MessageAttributeValue, ServiceError> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| ServiceError::Queue(e.to_string()))
    }
}

#[async_trait]
impl OrderQueueTrait for SqsOrderQueue {
    async fn send_order_for_processing(
        &self,
        message: &OrderProcessingMessage,
    ) -> Result<String, ServiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| ServiceError::Queue(format!("serialize processing message: {e}")))?;

        let response = self
            .client
            .send_message()
            .queue_url(&self.processing_queue_url)
            .message_body(body)
            .message_attributes("OrderId", Self::string_attribute(&message.order_id)?)
            .message_attributes("UserId", Self::string_attribute(&message.user_id)?)
            .send()
            .await
            .map_err(|e| ServiceError::Queue(e.to_string()))?;

        let message_id = response.message_id().unwrap_or_default().to_string();

        info!(
            "📤 Order {} sent to processing queue. MessageId: {message_id}",
            message.order_id
        );

        Ok(message_id)
    }

    async fn send_order_notification(
        &self,
        message: &OrderNotificationMessage,
    ) -> Result<String, ServiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| ServiceError::Queue(format!("serialize notification message: {e}")))?;

        let response = self
            .client
            .send_message()
            .queue_url(&self.notification_queue_url)
            .message_body(body)
            .message_attributes("OrderId", Self::string_attribute(&message.order_id)?)
            .message_attributes("UserEmail", Self::string_attribute(&message.user_email)?)
            .send()
            .await
            .map_err(|e| ServiceError::Queue(e.to_string()))?;

        let message_id = response.message_id().unwrap_or_default().to_string();

        info!(
            "📤 Notification for order {} sent to notification queue. MessageId: {message_id}",
            message.order_id
        );

        Ok(message_id)
    }

    async fn receive_messages(
        &self,
        kind: QueueKind,
    ) -> Result<Vec<QueueDelivery>, ServiceError> {
        let response = self
            .client
            .receive_message()
            .queue_url(self.queue_url(kind))
            .max_number_of_messages(MAX_BATCH_SIZE)
            .wait_time_seconds(LONG_POLL_SECONDS)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| ServiceError::Queue(e.to_string()))?;

        let deliveries = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let body = m.body?;
                let receipt_handle = m.receipt_handle?;
                Some(QueueDelivery {
                    body,
                    receipt_handle,
                })
            })
            .collect();

        Ok(deliveries)
    }

    async fn delete_message(
        &self,
        kind: QueueKind,
        receipt_handle: &str,
    ) -> Result<(), ServiceError> {
        self.client
            .delete_message()
            .queue_url(self.queue_url(kind))
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| ServiceError::Queue(e.to_string()))?;

        Ok(())
    }
}
