use crate::{
    abstract_trait::topic::NotificationTopicTrait, domain::message::OrderNotificationMessage,
    model::OrderStatus,
};
use async_trait::async_trait;
use aws_sdk_sns::{Client, types::MessageAttributeValue};
use shared::errors::ServiceError;
use tracing::info;

pub struct SnsNotificationTopic {
    client: Client,
    topic_arn: String,
}

impl SnsNotificationTopic {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    fn string_attribute(value: &str) -> Result<MessageAttributeValue, ServiceError> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| ServiceError::Topic(e.to_string()))
    }

    async fn publish(
        &self,
        subject: String,
        body: String,
        user_email: &str,
        order_id: &str,
    ) -> Result<String, ServiceError> {
        let response = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(body)
            // Attributes used by subscribers to filter per recipient/order.
            .message_attributes("email", Self::string_attribute(user_email)?)
            .message_attributes("orderId", Self::string_attribute(order_id)?)
            .send()
            .await
            .map_err(|e| ServiceError::Topic(e.to_string()))?;

        Ok(response.message_id().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl NotificationTopicTrait for SnsNotificationTopic {
    async fn publish_order_confirmation(
        &self,
        notification: &OrderNotificationMessage,
    ) -> Result<String, ServiceError> {
        let subject = format!("Order Confirmation - Order #{}", notification.order_id);
        let body = build_order_confirmation_body(notification);

        let message_id = self
            .publish(
                subject,
                body,
                &notification.user_email,
                &notification.order_id,
            )
            .await?;

        info!(
            "📧 Order confirmation published for order {}. MessageId: {message_id}",
            notification.order_id
        );

        Ok(message_id)
    }

    async fn publish_status_update(
        &self,
        order_id: &str,
        user_email: &str,
        status: OrderStatus,
    ) -> Result<String, ServiceError> {
        let subject = format!("Order Status Update - Order #{order_id}");
        let body = build_status_update_body(order_id, status);

        let message_id = self.publish(subject, body, user_email, order_id).await?;

        info!("📧 Status update published for order {order_id}. MessageId: {message_id}");

        Ok(message_id)
    }
}

fn build_order_confirmation_body(notification: &OrderNotificationMessage) -> String {
    let products_text = notification
        .products
        .iter()
        .map(|p| format!("• {} - Quantity: {} - ${:.2}", p.name, p.quantity, p.total_price))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Thank you for your order!\n\n\
         Dear Customer,\n\n\
         We've received your order and it's being processed.\n\n\
         Order Details:\n\
         Order ID: {}\n\
         Order Date: {}\n\
         Status: {}\n\n\
         Items Ordered:\n\
         {products_text}\n\n\
         Total Amount: ${:.2}\n\n\
         We'll send you another email when your order ships.\n\
         Thank you for shopping with Fresh Basket!",
        notification.order_id,
        notification.order_date.format("%Y-%m-%d %H:%M:%S"),
        notification.status,
        notification.total_amount,
    )
}

fn build_status_update_body(order_id: &str, status: OrderStatus) -> String {
    let status_message = match status {
        OrderStatus::Shipped => "Your order is on its way! You should receive it soon.",
        OrderStatus::Delivered => "Your order has been delivered! We hope you enjoy your purchase.",
        OrderStatus::Cancelled => {
            "Your order has been cancelled. If you have any questions, please contact support."
        }
        _ => "Your order status has been updated.",
    };

    format!(
        "Order Status Update\n\n\
         Your order #{order_id} status has been updated to: {}\n\n\
         {status_message}\n\n\
         Thank you for shopping with Fresh Basket!\n\n\
         If you have any questions, please contact our support team.",
        status.to_string().to_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::OrderLine;
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[test]
    fn confirmation_body_itemizes_and_totals() {
        let notification = OrderNotificationMessage {
            order_id: "o-1".into(),
            user_email: "u@example.com".into(),
            user_name: "u@example.com".into(),
            total_amount: Decimal::new(3000, 2),
            order_date: Utc::now(),
            status: "Processing".into(),
            products: vec![OrderLine {
                product_id: "p-1".into(),
                name: "Bananas".into(),
                price: Decimal::new(1000, 2),
                quantity: 2,
                total_price: Decimal::new(2000, 2),
            }],
        };

        let body = build_order_confirmation_body(&notification);
        assert!(body.contains("Order ID: o-1"));
        assert!(body.contains("• Bananas - Quantity: 2 - $20.00"));
        assert!(body.contains("Total Amount: $30.00"));
    }

    #[test]
    fn status_update_body_is_status_specific() {
        let shipped = build_status_update_body("o-1", OrderStatus::Shipped);
        assert!(shipped.contains("SHIPPED"));
        assert!(shipped.contains("on its way"));

        let cancelled = build_status_update_body("o-1", OrderStatus::Cancelled);
        assert!(cancelled.contains("has been cancelled"));
    }
}
