use crate::{
    abstract_trait::user::{
        repository::{DynUserCommandRepository, DynUserQueryRepository},
        service::{DynAuthService, DynUserQueryService},
    },
    config::Config,
    repository::user::{UserCommandRepository, UserQueryRepository},
    service::{AuthService, AuthServiceDeps, UserQueryService},
};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynHashing, DynJwtService},
    config::{AwsClients, Hashing, JwtConfig},
    utils::Metrics,
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DependenciesInject {
    pub auth_service: DynAuthService,
    pub user_query_service: DynUserQueryService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("auth_service", &"DynAuthService")
            .field("user_query_service", &"DynUserQueryService")
            .finish()
    }
}

impl DependenciesInject {
    pub async fn new(
        aws: &AwsClients,
        config: &Config,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let command_repo: DynUserCommandRepository = Arc::new(UserCommandRepository::new(
            aws.dynamodb.clone(),
            config.users_table.clone(),
        ));
        let query_repo: DynUserQueryRepository = Arc::new(UserQueryRepository::new(
            aws.dynamodb.clone(),
            config.users_table.clone(),
        ));

        let jwt: DynJwtService = Arc::new(JwtConfig::new(
            &config.jwt_secret,
            config.jwt_expiration_minutes,
        ));
        let hashing: DynHashing = Arc::new(Hashing::new());

        let auth_deps = AuthServiceDeps {
            command: command_repo,
            query: query_repo.clone(),
            jwt,
            hashing,
            expiration_minutes: config.jwt_expiration_minutes,
            metrics: Arc::new(Mutex::new(Metrics::new())),
            registry: registry.clone(),
        };

        let auth_service: DynAuthService = Arc::new(AuthService::new(auth_deps).await);

        let user_query_service: DynUserQueryService = Arc::new(
            UserQueryService::new(query_repo, Arc::new(Mutex::new(Metrics::new())), registry)
                .await,
        );

        Self {
            auth_service,
            user_query_service,
        }
    }
}
