use super::marshal::order_to_item;
use crate::{
    abstract_trait::order::repository::OrderCommandRepositoryTrait,
    model::{Order, OrderStatus},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use chrono::Utc;
use shared::errors::RepositoryError;

pub struct OrderCommandRepository {
    client: Client,
    table: String,
}

impl OrderCommandRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(order_to_item(order)))
            .send()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepositoryError> {
        // Full-record put, last-writer-wins. No optimistic concurrency.
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(order_to_item(order)))
            .send()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        Ok(())
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<(), RepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET #status = :status, updated_at = :updated_at")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .expression_attribute_values(":updated_at", AttributeValue::S(Utc::now().to_rfc3339()))
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    RepositoryError::NotFound
                } else {
                    RepositoryError::Dynamo(service_err.to_string())
                }
            })?;

        Ok(())
    }
}
