use crate::model::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynUserCommandRepository = Arc<dyn UserCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait UserCommandRepositoryTrait {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError>;

    /// Targeted write of the login timestamp. A missing user is
    /// `RepositoryError::NotFound`.
    async fn update_last_login(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}
