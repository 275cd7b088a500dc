use axum::{Extension, Json, extract::Path};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use app_auth::{AccountService, AuthUser};
use app_error::AppResult;
use app_models::user::{AuthResponse, LoginInput, SignUpInput, UpdateUserInput, UserProfile};

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn sign_up(
    Extension(service): Extension<Arc<AccountService>>,
    Json(input): Json<SignUpInput>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(service.sign_up(input).await?))
}

pub async fn login(
    Extension(service): Extension<Arc<AccountService>>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(service.login(input).await?))
}

pub async fn me(
    Extension(service): Extension<Arc<AccountService>>,
    user: AuthUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(service.get_self(user.0).await?))
}

pub async fn update_user(
    Extension(service): Extension<Arc<AccountService>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(service.update_user(user.0, id, input).await?))
}

pub async fn delete_user(
    Extension(service): Extension<Arc<AccountService>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    service.delete_user(user.0, id).await?;
    Ok(Json(json!({ "message": "User successfully deleted" })))
}
