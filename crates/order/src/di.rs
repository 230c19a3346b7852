use crate::{
    abstract_trait::{
        DynNotificationTopic, DynOrderQueue, DynUserClient,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
    },
    config::Config,
    http_client::UserHttpClient,
    messaging::{SnsNotificationTopic, SqsOrderQueue},
    repository::order::{OrderCommandRepository, OrderQueryRepository},
    service::{OrderCommandService, OrderCommandServiceDeps, OrderQueryService},
};
use prometheus_client::registry::Registry;
use shared::{config::AwsClients, utils::Metrics};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_command_service: DynOrderCommandService,
    pub order_query_service: DynOrderQueryService,
    pub order_command_repository: DynOrderCommandRepository,
    pub order_queue: DynOrderQueue,
    pub notification_topic: DynNotificationTopic,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_command_service", &"DynOrderCommandService")
            .field("order_query_service", &"DynOrderQueryService")
            .field("order_queue", &"DynOrderQueue")
            .finish()
    }
}

impl DependenciesInject {
    pub async fn new(
        aws: &AwsClients,
        config: &Config,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let command_repo: DynOrderCommandRepository = Arc::new(OrderCommandRepository::new(
            aws.dynamodb.clone(),
            config.orders_table.clone(),
        ));
        let query_repo: DynOrderQueryRepository = Arc::new(OrderQueryRepository::new(
            aws.dynamodb.clone(),
            config.orders_table.clone(),
        ));

        let order_queue: DynOrderQueue = Arc::new(SqsOrderQueue::new(
            aws.sqs.clone(),
            config.processing_queue_url.clone(),
            config.notification_queue_url.clone(),
        ));

        let notification_topic: DynNotificationTopic = Arc::new(SnsNotificationTopic::new(
            aws.sns.clone(),
            config.notification_topic_arn.clone(),
        ));

        let user_client: DynUserClient =
            Arc::new(UserHttpClient::new(config.user_service_base_url.clone()));

        let command_deps = OrderCommandServiceDeps {
            command: command_repo.clone(),
            query: query_repo.clone(),
            queue: order_queue.clone(),
            topic: notification_topic.clone(),
            user_client,
            metrics: Arc::new(Mutex::new(Metrics::new())),
            registry: registry.clone(),
        };

        let order_command_service: DynOrderCommandService =
            Arc::new(OrderCommandService::new(command_deps).await);

        let order_query_service: DynOrderQueryService = Arc::new(
            OrderQueryService::new(
                query_repo,
                Arc::new(Mutex::new(Metrics::new())),
                registry,
            )
            .await,
        );

        Self {
            order_command_service,
            order_query_service,
            order_command_repository: command_repo,
            order_queue,
            notification_topic,
        }
    }
}
