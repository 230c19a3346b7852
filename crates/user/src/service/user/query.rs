use crate::{
    abstract_trait::user::{
        repository::DynUserQueryRepository, service::UserQueryServiceTrait,
    },
    domain::response::user::UserResponse,
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils},
};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};

#[derive(Clone)]
pub struct UserQueryService {
    query: DynUserQueryRepository,
    metrics: Arc<Mutex<Metrics>>,
}

impl UserQueryService {
    pub async fn new(
        query: DynUserQueryRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        registry.lock().await.register(
            "user_query_service_request_counter",
            "Total number of requests to the UserQueryService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "user_query_service_request_duration",
            "Histogram of request durations for the UserQueryService",
            metrics.lock().await.request_duration.clone(),
        );

        Self { query, metrics }
    }
}

#[async_trait]
impl UserQueryServiceTrait for UserQueryService {
    async fn find_user(&self, id: &str) -> Result<UserResponse, ServiceError> {
        let started = Instant::now();

        let result = match self.query.find_by_id(id).await {
            Ok(Some(user)) => Ok(UserResponse::from(&user)),
            Ok(None) => Err(ServiceError::Repo(RepositoryError::NotFound)),
            Err(e) => Err(ServiceError::Repo(e)),
        };

        let status = if result.is_ok() {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        self.metrics
            .lock()
            .await
            .record(Method::Get, status, started.elapsed().as_secs_f64());

        result
    }
}
