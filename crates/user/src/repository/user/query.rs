use super::marshal::item_to_user;
use crate::{abstract_trait::user::repository::UserQueryRepositoryTrait, model::User};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use shared::errors::RepositoryError;

pub struct UserQueryRepository {
    client: Client,
    table: String,
}

impl UserQueryRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for UserQueryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        output.item().map(item_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let items = self
            .client
            .scan()
            .table_name(&self.table)
            .filter_expression("email = :email")
            .expression_attribute_values(":email", AttributeValue::S(email.to_string()))
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| RepositoryError::Dynamo(e.to_string()))?;

        items.first().map(item_to_user).transpose()
    }
}
