use super::marshal::item_to_order;
use crate::{abstract_trait::order::repository::OrderQueryRepositoryTrait, model::Order};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use shared::errors::RepositoryError;

pub struct OrderQueryRepository {
    client: Client,
    table: String,
}

impl OrderQueryRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        output.item().map(item_to_order).transpose()
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Order>, RepositoryError> {
        let items = self
            .client
            .scan()
            .table_name(&self.table)
            .filter_expression("user_id = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        items.iter().map(item_to_order).collect()
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let items = self
            .client
            .scan()
            .table_name(&self.table)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        items.iter().map(item_to_order).collect()
    }
}
