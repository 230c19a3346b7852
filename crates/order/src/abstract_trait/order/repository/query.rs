use crate::model::Order;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<Order>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;
}
