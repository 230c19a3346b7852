use crate::{domain::message::OrderNotificationMessage, model::OrderStatus};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynNotificationTopic = Arc<dyn NotificationTopicTrait + Send + Sync>;

/// Fan-out channel for customer-facing emails. Both operations return the
/// publish message id; an empty id means the publish did not take effect.
#[async_trait]
pub trait NotificationTopicTrait {
    async fn publish_order_confirmation(
        &self,
        notification: &OrderNotificationMessage,
    ) -> Result<String, ServiceError>;

    async fn publish_status_update(
        &self,
        order_id: &str,
        user_email: &str,
        status: OrderStatus,
    ) -> Result<String, ServiceError>;
}
