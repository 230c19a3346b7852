use crate::domain::message::{OrderNotificationMessage, OrderProcessingMessage};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::fmt;
use std::sync::Arc;

pub type DynOrderQueue = Arc<dyn OrderQueueTrait + Send + Sync>;

/// Selects which of the two work queues an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Processing,
    Notification,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Processing => f.write_str("order-processing"),
            QueueKind::Notification => f.write_str("order-notification"),
        }
    }
}

/// One received message. The receipt handle is the acknowledgment token:
/// it is only valid while this delivery is in flight, and redelivery issues
/// a fresh one.
#[derive(Debug, Clone)]
pub struct QueueDelivery {
    pub body: String,
    pub receipt_handle: String,
}

#[async_trait]
pub trait OrderQueueTrait {
    /// Returns the transport message id on success.
    async fn send_order_for_processing(
        &self,
        message: &OrderProcessingMessage,
    ) -> Result<String, ServiceError>;

    /// Returns the transport message id on success.
    async fn send_order_notification(
        &self,
        message: &OrderNotificationMessage,
    ) -> Result<String, ServiceError>;

    /// Long-polls for up to 10 messages; an empty vec means an empty poll.
    async fn receive_messages(&self, kind: QueueKind)
    -> Result<Vec<QueueDelivery>, ServiceError>;

    /// Acknowledges (removes) a specific delivery.
    async fn delete_message(
        &self,
        kind: QueueKind,
        receipt_handle: &str,
    ) -> Result<(), ServiceError>;
}
