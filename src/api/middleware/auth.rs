//! Bearer token authentication middleware.
//!
//! Two flavors share the token path: [`require`] rejects requests without a
//! valid token, [`optional`] lets them through unauthenticated. Both insert
//! the resolved [`CurrentUser`] into request extensions for handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Rejects requests lacking a valid Bearer token.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, malformed, or the
/// token is unknown or revoked.
pub async fn require(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let user = st.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Authenticates when a Bearer token is present, passes through otherwise.
///
/// A present-but-invalid token is still rejected with 401: silently
/// downgrading a bad token to "anonymous" would mask credential problems.
pub async fn optional(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token);

    let mut req = Request::from_parts(parts, body);

    if let Some(token) = token {
        let user = st.auth_service.authenticate(&token).await?;
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}
