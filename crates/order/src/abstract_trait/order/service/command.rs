use crate::domain::{
    requests::order::CreateOrderRequest,
    response::{api::ApiResponse, order::OrderResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;

    async fn update_order_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;

    async fn cancel_order(&self, id: &str) -> Result<ApiResponse<()>, ServiceError>;
}
