use crate::domain::response::{api::ApiResponse, order::OrderResponse};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_order(&self, id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError>;

    async fn find_orders_by_user(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;

    async fn find_all_orders(&self) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;
}
