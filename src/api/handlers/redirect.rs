//! Handlers for short link resolution.
//!
//! `GET /{code}` is the direct redirect path: no credentials travel with a
//! plain GET, so gated links answer with a challenge instead of a redirect.
//! `POST /{code}` carries credentials and returns the destination as JSON for
//! the caller to follow.
//!
//! The outcome-to-status mapping keeps every case distinct: 404 unknown code,
//! 410 expired, 410 quota exceeded (separate error codes), 401 challenge,
//! 403 denied with the specific reason, and success.

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use std::net::SocketAddr;

use crate::api::dto::access::{AccessChallenge, AccessRequest, ResolveResponse};
use crate::application::services::{Outcome, VisitorInfo};
use crate::domain::access::{Credentials, DenyReason};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Ungated links redirect with 307 Temporary Redirect. Gated links cannot be
/// satisfied by a bare GET and answer 401 with the credential kinds required.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let visitor = visitor_info(&state, &headers, addr);

    let outcome = state
        .resolution_service
        .resolve(&code, &Credentials::default(), &visitor)
        .await?;

    Ok(match outcome {
        Outcome::Resolved { url } => Redirect::temporary(&url).into_response(),
        other => outcome_response(other),
    })
}

/// Resolves a gated short code with submitted credentials.
///
/// # Endpoint
///
/// `POST /{code}` with body `{"access_code": "...", "email": "..."}`
///
/// On success returns `{"url": "..."}`; the caller performs the redirect.
pub async fn access_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<AccessRequest>,
) -> Result<Response, AppError> {
    let visitor = visitor_info(&state, &headers, addr);

    let credentials = Credentials {
        access_code: payload.access_code.filter(|c| !c.is_empty()),
        email: payload.email.filter(|e| !e.is_empty()),
    };

    let outcome = state
        .resolution_service
        .resolve(&code, &credentials, &visitor)
        .await?;

    Ok(match outcome {
        Outcome::Resolved { url } => Json(ResolveResponse { url }).into_response(),
        other => outcome_response(other),
    })
}

fn visitor_info(state: &AppState, headers: &HeaderMap, addr: SocketAddr) -> VisitorInfo {
    VisitorInfo {
        ip: client_ip(headers, addr, state.behind_proxy),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

/// Maps every non-success outcome to its response.
///
/// Exhaustive on purpose: collapsing any two of these into one generic
/// failure loses information the caller needs.
fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Resolved { .. } => unreachable!("handled by the caller"),
        Outcome::NotFound => {
            AppError::not_found("Short link not found", serde_json::json!({})).into_response()
        }
        Outcome::Expired => error_response(
            StatusCode::GONE,
            "link_expired",
            "This link has expired",
        ),
        Outcome::QuotaExceeded => error_response(
            StatusCode::GONE,
            "quota_exceeded",
            "This link has reached its click limit",
        ),
        Outcome::AccessChallengeRequired {
            needs_access_code,
            needs_email,
        } => (
            StatusCode::UNAUTHORIZED,
            Json(AccessChallenge {
                error: "access_required",
                requires_access_code: needs_access_code,
                requires_email: needs_email,
            }),
        )
            .into_response(),
        Outcome::Denied(DenyReason::InvalidAccessCode) => error_response(
            StatusCode::FORBIDDEN,
            "invalid_access_code",
            "Invalid access code",
        ),
        Outcome::Denied(DenyReason::EmailNotAuthorized) => error_response(
            StatusCode::FORBIDDEN,
            "email_not_authorized",
            "This email is not authorized to access the link",
        ),
        // the engine folds these into the dedicated outcomes above
        Outcome::Denied(DenyReason::Expired) => {
            error_response(StatusCode::GONE, "link_expired", "This link has expired")
        }
        Outcome::Denied(DenyReason::QuotaExceeded) => error_response(
            StatusCode::GONE,
            "quota_exceeded",
            "This link has reached its click limit",
        ),
    }
}

fn error_response(status: StatusCode, code: &'static str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": { "code": code, "message": message, "details": {} }
        })),
    )
        .into_response()
}
