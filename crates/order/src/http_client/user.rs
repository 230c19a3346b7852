use crate::abstract_trait::user_client::{TokenValidation, UserClientTrait};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared::errors::ServiceError;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenValidationResponse {
    is_valid: bool,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserLookupResponse {
    #[serde(default)]
    email: String,
}

/// HTTP client against the user collaborator service.
pub struct UserHttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl UserHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl UserClientTrait for UserHttpClient {
    async fn validate_token(&self, token: &str) -> Result<TokenValidation, ServiceError> {
        let url = format!("{}/api/token/validate", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| ServiceError::Collaborator(format!("token validation call: {e}")))?;

        if !response.status().is_success() {
            warn!("Token validation failed with status: {}", response.status());
            return Err(ServiceError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let validation: TokenValidationResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Collaborator(format!("token validation body: {e}")))?;

        if !validation.is_valid {
            return Err(ServiceError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        info!("Token validation successful for user: {}", validation.user_id);

        Ok(TokenValidation {
            user_id: validation.user_id,
            email: validation.email,
            roles: validation.roles,
        })
    }

    async fn get_user_email(&self, user_id: &str) -> Result<Option<String>, ServiceError> {
        let url = format!("{}/api/users/{user_id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Collaborator(format!("user lookup call: {e}")))?;

        if !response.status().is_success() {
            warn!(
                "Failed to get user by id. Status: {}, user_id: {user_id}",
                response.status()
            );
            return Ok(None);
        }

        let user: UserLookupResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Collaborator(format!("user lookup body: {e}")))?;

        if user.email.is_empty() {
            return Ok(None);
        }

        Ok(Some(user.email))
    }
}
