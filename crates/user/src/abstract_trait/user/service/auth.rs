use crate::domain::{
    requests::auth::{LoginRequest, RegisterRequest},
    response::{
        api::ApiResponse,
        user::{LoginResponse, TokenValidationResponse},
    },
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynAuthService = Arc<dyn AuthServiceTrait + Send + Sync>;

#[async_trait]
pub trait AuthServiceTrait {
    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<LoginResponse>, ServiceError>;

    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<ApiResponse<LoginResponse>, ServiceError>;

    /// Resolves a bearer token to the identity baked into its claims. A
    /// rejected token is an `Unauthorized` error, never `is_valid: false`.
    async fn validate_token(&self, token: &str)
    -> Result<TokenValidationResponse, ServiceError>;
}
