use crate::{
    handlers::{delete_user, health_check, login, me, sign_up, update_user},
    middleware::{logging_middleware, security_headers_middleware},
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use axum::{
    Router,
    extract::Extension,
    routing::{get, post, put},
};

use app_auth::{AccountService, require_auth};
use app_config::AppConfig;
use app_error::middleware_handling::error_handling_middleware;

pub const AUTH_PREFIX: &str = "/api/v1/auth";

/// Builds the router from the configuration `main` already loaded and
/// validated; nothing here re-reads configuration sources.
pub fn create_routes(account_service: Arc<AccountService>, config: &AppConfig) -> Router {
    let body_limit = config.server.body_limit;
    let cors_config = &config.security.cors;

    let jwt_service = account_service.get_jwt_service();

    // Configure CORS with settings from config
    let cors = CorsLayer::new()
        .allow_origin(
            if cors_config.allowed_origins.contains(&"*".to_string()) {
                tower_http::cors::AllowOrigin::any()
            } else {
                tower_http::cors::AllowOrigin::list(
                    cors_config
                        .allowed_origins
                        .iter()
                        .filter_map(|origin| origin.parse().ok())
                        .collect::<Vec<_>>(),
                )
            },
        )
        .allow_methods(
            cors_config
                .allowed_methods
                .iter()
                .filter_map(|method| method.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_headers(
            cors_config
                .allowed_headers
                .iter()
                .filter_map(|header| header.parse().ok())
                .collect::<Vec<_>>(),
        );

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors);

    // Every route behind the auth gate either carries an authenticated
    // identity or is rejected before its handler runs.
    let protected = Router::new()
        .route(&format!("{}/me", AUTH_PREFIX), get(me))
        .route(
            &format!("{}/{{id}}", AUTH_PREFIX),
            put(update_user).delete(delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_service,
            require_auth,
        ));

    let app = Router::new()
        .route("/health", get(health_check))
        .route(&format!("{}/signup", AUTH_PREFIX), post(sign_up))
        .route(&format!("{}/login", AUTH_PREFIX), post(login))
        .merge(protected);

    let app = app.layer(Extension(account_service));

    let app = app
        .layer(axum::middleware::from_fn(error_handling_middleware))
        .layer(RequestBodyLimitLayer::new(body_limit));

    let app = app
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    app.layer(middleware_stack)
}
