use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use uuid::Uuid;

use crate::{AppState, error::AppError};

/// Identity attached to requests that passed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Resolves `Authorization: Bearer <token>` to a live user.
///
/// Every rejection is reported as [`AppError::Unauthorized`]; the concrete
/// reason only goes to the debug log.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() else {
        tracing::debug!("rejected request: missing or malformed bearer header");
        return Err(AppError::Unauthorized);
    };

    let user_id = state.tokens.verify(bearer.token()).map_err(|e| {
        tracing::debug!("rejected request: {}", e);
        AppError::Unauthorized
    })?;

    match state.credentials.find_by_id(user_id).await? {
        Some(user) => Ok(AuthUser { id: user.id }),
        None => {
            tracing::debug!("rejected request: token subject {} no longer exists", user_id);
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
