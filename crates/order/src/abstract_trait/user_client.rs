use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynUserClient = Arc<dyn UserClientTrait + Send + Sync>;

/// Identity attached to a validated bearer token.
#[derive(Debug, Clone)]
pub struct TokenValidation {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[async_trait]
pub trait UserClientTrait {
    /// Rejects invalid or expired tokens with `ServiceError::Unauthorized`.
    async fn validate_token(&self, token: &str) -> Result<TokenValidation, ServiceError>;

    /// Resolves the recipient email for status-update notifications.
    /// `None` when the user exists but carries no email.
    async fn get_user_email(&self, user_id: &str) -> Result<Option<String>, ServiceError>;
}
