use crate::{
    abstract_trait::user::service::DynUserQueryService, domain::response::user::UserResponse,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(service): Extension<DynUserQueryService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    // Unwrapped payload; the order service reads `email` out of it.
    let response = service.find_user(&id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn user_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/users/{id}", get(get_user))
        .layer(Extension(app_state.di_container.user_query_service.clone()))
}
