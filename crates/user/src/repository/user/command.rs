use super::marshal::user_to_item;
use crate::{abstract_trait::user::repository::UserCommandRepositoryTrait, model::User};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;

pub struct UserCommandRepository {
    client: Client,
    table: String,
}

impl UserCommandRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for UserCommandRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(user_to_item(user)))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    RepositoryError::AlreadyExists(format!("user '{}' already exists", user.id))
                } else {
                    RepositoryError::Dynamo(service_err.to_string())
                }
            })?;

        Ok(())
    }

    async fn update_last_login(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression("SET last_login_at = :at")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_values(":at", AttributeValue::S(at.to_rfc3339()))
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
