use crate::{
    abstract_trait::order::{
        repository::DynOrderQueryRepository, service::OrderQueryServiceTrait,
    },
    domain::response::{api::ApiResponse, order::OrderResponse},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils},
};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::info;

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    metrics: Arc<Mutex<Metrics>>,
}

impl OrderQueryService {
    pub async fn new(
        query: DynOrderQueryRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        registry.lock().await.register(
            "order_query_service_request_counter",
            "Total number of requests to the OrderQueryService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "order_query_service_request_duration",
            "Histogram of request durations for the OrderQueryService",
            metrics.lock().await.request_duration.clone(),
        );

        Self { query, metrics }
    }

    async fn record(&self, status: StatusUtils, started: Instant) {
        self.metrics
            .lock()
            .await
            .record(Method::Get, status, started.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_order(&self, id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let started = Instant::now();

        let order = match self.query.find_by_id(id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                self.record(StatusUtils::Error, started).await;
                return Err(ServiceError::Repo(RepositoryError::NotFound));
            }
            Err(e) => {
                self.record(StatusUtils::Error, started).await;
                return Err(ServiceError::Repo(e));
            }
        };

        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Order retrieved successfully".into(),
            data: OrderResponse::from(&order),
        })
    }

    async fn find_orders_by_user(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        let started = Instant::now();

        let orders = match self.query.find_by_user_id(user_id).await {
            Ok(orders) => orders,
            Err(e) => {
                self.record(StatusUtils::Error, started).await;
                return Err(ServiceError::Repo(e));
            }
        };

        info!("🔍 Found {} orders for user {user_id}", orders.len());
        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Orders retrieved successfully".into(),
            data: orders.iter().map(OrderResponse::from).collect(),
        })
    }

    async fn find_all_orders(&self) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        let started = Instant::now();

        let orders = match self.query.find_all().await {
            Ok(orders) => orders,
            Err(e) => {
                self.record(StatusUtils::Error, started).await;
                return Err(ServiceError::Repo(e));
            }
        };

        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Orders retrieved successfully".into(),
            data: orders.iter().map(OrderResponse::from).collect(),
        })
    }
}
