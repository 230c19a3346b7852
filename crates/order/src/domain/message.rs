use crate::model::{Order, OrderStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One line item as it travels on the wire and in the serialized
/// `products` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// Snapshot of an order at creation time, enqueued on the processing queue.
///
/// The transport receipt handle is deliberately *not* part of this payload;
/// it travels out-of-band on the delivery (see `QueueDelivery`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProcessingMessage {
    pub order_id: String,
    pub user_id: String,
    pub user_email: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub products: Vec<OrderLine>,
}

impl OrderProcessingMessage {
    pub fn from_order(order: &Order, user_email: &str, products: Vec<OrderLine>) -> Self {
        Self {
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            user_email: user_email.to_string(),
            total_amount: order.total_amount(),
            created_at: order.created_at,
            products,
        }
    }
}

/// Payload of the notification queue, built by the processing worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotificationMessage {
    pub order_id: String,
    pub user_email: String,
    pub user_name: String,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub products: Vec<OrderLine>,
}

impl OrderNotificationMessage {
    pub fn from_processing(msg: &OrderProcessingMessage) -> Self {
        Self {
            order_id: msg.order_id.clone(),
            user_email: msg.user_email.clone(),
            // The processing snapshot carries no display name; fall back to
            // the email.
            user_name: msg.user_email.clone(),
            total_amount: msg.total_amount,
            order_date: msg.created_at,
            status: OrderStatus::Processing.to_string(),
            products: msg.products.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_line() -> OrderLine {
        OrderLine {
            product_id: "p-1".into(),
            name: "Bananas".into(),
            price: Decimal::new(1000, 2),
            quantity: 2,
            total_price: Decimal::new(2000, 2),
        }
    }

    #[test]
    fn processing_message_uses_camel_case_field_names() {
        let msg = OrderProcessingMessage {
            order_id: "o-1".into(),
            user_id: "u-1".into(),
            user_email: "u@example.com".into(),
            total_amount: Decimal::new(3000, 2),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            products: vec![sample_line()],
        };

        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert!(value.get("orderId").is_some());
        assert!(value.get("userEmail").is_some());
        assert!(value.get("totalAmount").is_some());
        assert!(value["products"][0].get("totalPrice").is_some());
        // No acknowledgment token on the wire.
        assert!(value.get("receiptHandle").is_none());
    }

    #[test]
    fn decimal_amounts_deserialize_from_strings_and_numbers() {
        let from_string: OrderLine = serde_json::from_str(
            r#"{"productId":"p-1","name":"Bananas","price":"10.00","quantity":2,"totalPrice":"20.00"}"#,
        )
        .unwrap();
        let from_number: OrderLine = serde_json::from_str(
            r#"{"productId":"p-1","name":"Bananas","price":10.0,"quantity":2,"totalPrice":20.0}"#,
        )
        .unwrap();

        assert_eq!(from_string.price, from_number.price);
        assert_eq!(from_string.total_price, Decimal::new(2000, 2));
    }

    #[test]
    fn notification_message_falls_back_to_email_for_name() {
        let processing = OrderProcessingMessage {
            order_id: "o-1".into(),
            user_id: "u-1".into(),
            user_email: "u@example.com".into(),
            total_amount: Decimal::new(3000, 2),
            created_at: Utc::now(),
            products: vec![sample_line()],
        };

        let notification = OrderNotificationMessage::from_processing(&processing);
        assert_eq!(notification.user_name, "u@example.com");
        assert_eq!(notification.status, "Processing");
        assert_eq!(notification.total_amount, processing.total_amount);
    }
}
