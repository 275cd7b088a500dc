use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::JwtService;
use app_error::{AppError, AppResult};

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated identity attached to a request by [`require_auth`].
/// Lives only for the duration of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl AuthUser {
    /// The identity rendered as it is stored: the bare record key.
    pub fn key(&self) -> String {
        self.0.simple().to_string()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(AppError::token_invalid)
    }
}

/// Auth gate: a request either comes out the other side carrying an
/// [`AuthUser`], or it is rejected with 401 and no handler runs.
pub async fn require_auth(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&jwt_service, req.headers()) {
        Ok(user) => {
            debug!("Authenticated request for user {}", user.key());
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected unauthenticated request: {}", e);
            e.into_response()
        }
    }
}

fn authenticate(jwt_service: &JwtService, headers: &HeaderMap) -> AppResult<AuthUser> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AppError::token_invalid)?;

    let auth_str = header_value
        .to_str()
        .map_err(|_| AppError::token_invalid())?;

    // Only strip a recognized scheme prefix; anything else is malformed.
    // strip_prefix also covers values shorter than the prefix itself.
    let token = auth_str
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(AppError::token_invalid)?;

    let claims = jwt_service.validate_token(token)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        debug!("Token subject is not a valid user id");
        AppError::token_invalid()
    })?;

    Ok(AuthUser(user_id))
}
