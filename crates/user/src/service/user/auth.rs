use crate::{
    abstract_trait::user::{
        repository::{DynUserCommandRepository, DynUserQueryRepository},
        service::AuthServiceTrait,
    },
    domain::{
        requests::auth::{LoginRequest, RegisterRequest},
        response::{
            api::ApiResponse,
            user::{LoginResponse, TokenValidationResponse, UserResponse},
        },
    },
    model::User,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynHashing, DynJwtService},
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils, TracingContext},
};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AuthService {
    command: DynUserCommandRepository,
    query: DynUserQueryRepository,
    jwt: DynJwtService,
    hashing: DynHashing,
    expiration_minutes: i64,
    metrics: Arc<Mutex<Metrics>>,
}

pub struct AuthServiceDeps {
    pub command: DynUserCommandRepository,
    pub query: DynUserQueryRepository,
    pub jwt: DynJwtService,
    pub hashing: DynHashing,
    pub expiration_minutes: i64,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

impl AuthService {
    pub async fn new(deps: AuthServiceDeps) -> Self {
        let AuthServiceDeps {
            command,
            query,
            jwt,
            hashing,
            expiration_minutes,
            metrics,
            registry,
        } = deps;

        registry.lock().await.register(
            "auth_service_request_counter",
            "Total number of requests to the AuthService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "auth_service_request_duration",
            "Histogram of request durations for the AuthService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            command,
            query,
            jwt,
            hashing,
            expiration_minutes,
            metrics,
        }
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("auth-service")
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

    fn login_payload(&self, user: &User) -> Result<LoginResponse, ServiceError> {
        let token = self.jwt.generate_token(&user.id, &user.email, &user.roles)?;
        let expires_at = Utc::now() + Duration::minutes(self.expiration_minutes);

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<LoginResponse>, ServiceError> {
        let method = Method::Post;

        let tracing_ctx = self.start_tracing(
            "register_user",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("operation", "register"),
            ],
        );

        match self.query.find_by_email(&request.email).await {
            Ok(Some(_)) => {
                self.complete_tracing_error(&tracing_ctx, method, "Email already registered")
                    .await;
                return Err(ServiceError::Repo(RepositoryError::AlreadyExists(
                    format!("email '{}' is already registered", request.email),
                )));
            }
            Ok(None) => {}
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Email lookup failed")
                    .await;
                return Err(ServiceError::Repo(e));
            }
        }

        let password_hash = self.hashing.hash_password(&request.password).await?;
        let user = User::new(request.email.clone(), password_hash, request.roles.clone());

        info!("🧾 Registering user {} ({})", user.id, user.email);

        if let Err(e) = self.command.create_user(&user).await {
            self.complete_tracing_error(&tracing_ctx, method, "User persist failed")
                .await;
            return Err(ServiceError::Repo(e));
        }

        let payload = self.login_payload(&user)?;

        self.complete_tracing_success(&tracing_ctx, method, "User registered")
            .await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "User registered successfully".into(),
            data: payload,
        })
    }

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<ApiResponse<LoginResponse>, ServiceError> {
        let method = Method::Post;

        let tracing_ctx = self.start_tracing(
            "login_user",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("operation", "login"),
            ],
        );

        let mut user = match self.query.find_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.complete_tracing_error(&tracing_ctx, method, "Unknown email")
                    .await;
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => {
                self.complete_tracing_error(&tracing_ctx, method, "Email lookup failed")
                    .await;
                return Err(ServiceError::Repo(e));
            }
        };

        if let Err(e) = self
            .hashing
            .compare_password(&user.password_hash, &request.password)
            .await
        {
            self.complete_tracing_error(&tracing_ctx, method, "Password mismatch")
                .await;
            return Err(e);
        }

        if !user.is_active {
            self.complete_tracing_error(&tracing_ctx, method, "Account deactivated")
                .await;
            return Err(ServiceError::Unauthorized(
                "Account is deactivated".to_string(),
            ));
        }

        let now = Utc::now();

        // The login itself succeeds even when the timestamp write fails.
        if let Err(e) = self.command.update_last_login(&user.id, now).await {
            warn!("Failed to record login time for user {}: {e}", user.id);
        } else {
            user.last_login_at = Some(now);
        }

        let payload = self.login_payload(&user)?;

        self.complete_tracing_success(&tracing_ctx, method, "User logged in")
            .await;

        Ok(ApiResponse {
            status: "success".into(),
            message: "Login successful".into(),
            data: payload,
        })
    }

    async fn validate_token(
        &self,
        token: &str,
    ) -> Result<TokenValidationResponse, ServiceError> {
        let claims = self.jwt.verify_token(token)?;

        Ok(TokenValidationResponse {
            is_valid: true,
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_trait::user::repository::{
        UserCommandRepositoryTrait, UserQueryRepositoryTrait,
    };
    use chrono::DateTime;
    use shared::config::{Hashing, JwtConfig};
    use std::collections::HashMap;

    #[derive(Default)]
    struct InMemoryUserStore {
        users: Mutex<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserCommandRepositoryTrait for InMemoryUserStore {
        async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
            let mut users = self.users.lock().await;
            if users.contains_key(&user.id) {
                return Err(RepositoryError::AlreadyExists(user.id.clone()));
            }
            users.insert(user.id.clone(), user.clone());
            Ok(())
        }

        async fn update_last_login(
            &self,
            id: &str,
            at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut users = self.users.lock().await;
            match users.get_mut(id) {
                Some(user) => {
                    user.last_login_at = Some(at);
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }
    }

    #[async_trait]
    impl UserQueryRepositoryTrait for InMemoryUserStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.lock().await.get(id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .await
                .values()
                .find(|user| user.email == email)
                .cloned())
        }
    }

    async fn service() -> (AuthService, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::default());
        let deps = AuthServiceDeps {
            command: store.clone(),
            query: store.clone(),
            jwt: Arc::new(JwtConfig::new("test-secret", 60)),
            hashing: Arc::new(Hashing::new()),
            expiration_minutes: 60,
            metrics: Arc::new(Mutex::new(Metrics::new())),
            registry: Arc::new(Mutex::new(Registry::default())),
        };

        (AuthService::new(deps).await, store)
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "user@example.com".into(),
            password: "correct-horse".into(),
            roles: Vec::new(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let (service, _store) = service().await;

        let registered = service.register(&register_request()).await.unwrap();
        assert_eq!(registered.data.user.roles, vec!["User".to_string()]);

        let login = service
            .login(&LoginRequest {
                email: "user@example.com".into(),
                password: "correct-horse".into(),
            })
            .await
            .unwrap();

        assert!(!login.data.token.is_empty());
        assert!(login.data.user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, _store) = service().await;

        service.register(&register_request()).await.unwrap();
        let err = service.register(&register_request()).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (service, _store) = service().await;
        service.register(&register_request()).await.unwrap();

        let err = service
            .login(&LoginRequest {
                email: "user@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn deactivated_account_cannot_login() {
        let (service, store) = service().await;
        let registered = service.register(&register_request()).await.unwrap();

        store
            .users
            .lock()
            .await
            .get_mut(&registered.data.user.id)
            .unwrap()
            .is_active = false;

        let err = service
            .login(&LoginRequest {
                email: "user@example.com".into(),
                password: "correct-horse".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn issued_token_validates_back_to_the_user() {
        let (service, _store) = service().await;
        let registered = service.register(&register_request()).await.unwrap();

        let validation = service
            .validate_token(&registered.data.token)
            .await
            .unwrap();

        assert!(validation.is_valid);
        assert_eq!(validation.user_id, registered.data.user.id);
        assert_eq!(validation.email, "user@example.com");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (service, _store) = service().await;

        assert!(service.validate_token("not-a-jwt").await.is_err());
    }
}
