use crate::{
    abstract_trait::{
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::OrderCommandServiceTrait,
        },
        queue::DynOrderQueue,
        topic::DynNotificationTopic,
        user_client::DynUserClient,
    },
    domain::{
        message::{OrderLine, OrderProcessingMessage},
        requests::order::CreateOrderRequest,
        response::{api::ApiResponse, order::OrderResponse},
    },
    model::{Order, OrderStatus},
};
use shared::{
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils, TracingContext},
};

use async_trait::async_trait;
use chrono::Utc;
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct OrderCommandService {
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    queue: DynOrderQueue,
    topic: DynNotificationTopic,
    user_client: DynUserClient,
    metrics: Arc<Mutex<Metrics>>,
}

pub struct OrderCommandServiceDeps {
    pub command: DynOrderCommandRepository,
    pub query: DynOrderQueryRepository,
    pub queue: DynOrderQueue,
    pub topic: DynNotificationTopic,
    pub user_client: DynUserClient,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

impl OrderCommandService {
    pub async fn new(deps: OrderCommandServiceDeps) -> Self {
        let OrderCommandServiceDeps {
            command,
            query,
            queue,
            topic,
            user_client,
            metrics,
            registry,
        } = deps;

        registry.lock().await.register(
            "order_command_service_request_counter",
            "Total number of requests to the OrderCommandService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "order_command_service_request_duration",
            "Histogram of request durations for the OrderCommandService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            command,
            query,
            queue,
            topic,
            user_client,
            metrics,
        }
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("order-command-service")
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![
                KeyValue::new("operation", operation_name.to_string()),
                KeyValue::new("timestamp", start_time.elapsed().as_secs_f64().to_string()),
            ],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    async fn complete_tracing_success(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        message: &str,
    ) {
        self.complete_tracing_internal(tracing_ctx, method, true, message)
            .await;
    }

    async fn complete_tracing_error(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        error_message: &str,
    ) {
        self.complete_tracing_internal(tracing_ctx, method, false, error_message)
            .await;
    }

    async fn complete_tracing_internal(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.lock().await.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    /// Best-effort status-change email. Failures are logged, never surfaced
    /// to the caller; there is no queue behind these to retry against.
    async fn notify_status_change(&self, order_id: &str, user_id: &str, status: OrderStatus) {
        match self.user_client.get_user_email(user_id).await {
            Ok(Some(email)) => {
                if let Err(e) = self
                    .topic
                    .publish_status_update(order_id, &email, status)
                    .await
                {
                    warn!("Failed to send status update notification for order {order_id}: {e}");
                } else {
                    info!("Status update notification sent for order {order_id}");
                }
            }
            Ok(None) => {
                warn!("Could not retrieve user email for order {order_id} status update");
            }
            Err(e) => {
                warn!("User lookup failed for order {order_id} status update: {e}");
            }
        }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Post;

        let tracing_ctx = self.start_tracing(
            "create_order",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "create"),
            ],
        );

        let user = match self.user_client.validate_token(&req.auth_token).await {
            Ok(user) => user,
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Token validation failed")
                    .await;
                return Err(e);
            }
        };

        if req.products.is_empty() {
            self.complete_tracing_error(&tracing_ctx, method, "Products cannot be empty")
                .await;
            return Err(ServiceError::Validation(vec![
                "Products cannot be empty".into(),
            ]));
        }

        let lines: Vec<OrderLine> = req
            .products
            .iter()
            .map(|p| OrderLine {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                price: p.price,
                quantity: p.quantity,
                total_price: p.total_price(),
            })
            .collect();

        let subtotal: Decimal = lines.iter().map(|line| line.total_price).sum();

        let products_json = serde_json::to_string(&lines)
            .map_err(|e| ServiceError::Custom(format!("serialize line items: {e}")))?;

        let order = Order::new(user.user_id.clone(), products_json, subtotal, req.delivery_fee);

        info!("🏗️ Creating order {} for user {}", order.id, user.user_id);

        if let Err(e) = self.command.create_order(&order).await {
            self.complete_tracing_error(&tracing_ctx, method, "Order persist failed")
                .await;
            return Err(ServiceError::Repo(e));
        }

        let message = OrderProcessingMessage::from_order(&order, &user.email, lines);

        // Deliberate eventually-consistent handoff: the order exists even
        // when the enqueue fails; processing is merely delayed.
        match self.queue.send_order_for_processing(&message).await {
            Ok(_) => info!("Order {} sent for processing", order.id),
            Err(e) => warn!("Failed to send order {} for processing: {e}", order.id),
        }

        self.complete_tracing_success(&tracing_ctx, method, "Order created")
            .await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Order created successfully".into(),
            data: OrderResponse::from(&order),
        })
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Patch;

        let tracing_ctx = self.start_tracing(
            "update_order_status",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "update_status"),
                KeyValue::new("order_id", id.to_string()),
            ],
        );

        let new_status = match status.parse::<OrderStatus>() {
            Ok(parsed) => parsed,
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Invalid status label")
                    .await;
                return Err(ServiceError::InvalidStatus(e));
            }
        };

        let mut order = match self.query.find_by_id(id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                self.complete_tracing_error(&tracing_ctx, method, "Order not found")
                    .await;
                return Err(ServiceError::Repo(RepositoryError::NotFound));
            }
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Order load failed")
                    .await;
                return Err(ServiceError::Repo(e));
            }
        };

        let old_status = order.status;
        order.status = new_status;
        order.updated_at = Utc::now();

        if let Err(e) = self.command.save_order(&order).await {
            self.complete_tracing_error(&tracing_ctx, method, "Order save failed")
                .await;
            return Err(ServiceError::Repo(e));
        }

        // Processing transitions are announced by the worker itself.
        if old_status != new_status && new_status != OrderStatus::Processing {
            self.notify_status_change(&order.id, &order.user_id, new_status)
                .await;
        }

        self.complete_tracing_success(&tracing_ctx, method, "Order status updated")
            .await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Order status updated successfully".into(),
            data: OrderResponse::from(&order),
        })
    }

    async fn cancel_order(&self, id: &str) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;

        let tracing_ctx = self.start_tracing(
            "cancel_order",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "cancel"),
                KeyValue::new("order_id", id.to_string()),
            ],
        );

        let mut order = match self.query.find_by_id(id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                self.complete_tracing_error(&tracing_ctx, method, "Order not found")
                    .await;
                return Err(ServiceError::Repo(RepositoryError::NotFound));
            }
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Order load failed")
                    .await;
                return Err(ServiceError::Repo(e));
            }
        };

        if !order.status.is_cancellable() {
            self.complete_tracing_error(&tracing_ctx, method, "Order not cancellable")
                .await;
            return Err(ServiceError::NotCancellable(order.status.to_string()));
        }

        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();

        if let Err(e) = self.command.save_order(&order).await {
            self.complete_tracing_error(&tracing_ctx, method, "Order save failed")
                .await;
            return Err(ServiceError::Repo(e));
        }

        self.notify_status_change(&order.id, &order.user_id, OrderStatus::Cancelled)
            .await;

        self.complete_tracing_success(&tracing_ctx, method, "Order cancelled")
            .await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Order cancelled successfully".into(),
            data: (),
        })
    }
}
