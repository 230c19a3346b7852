use crate::model::{Order, OrderStatus};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Full-record save, last-writer-wins.
    async fn save_order(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Targeted status write. Idempotent: setting the same status twice is a
    /// no-op success. A missing order is `RepositoryError::NotFound`.
    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<(), RepositoryError>;
}
