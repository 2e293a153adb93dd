//! Handler for link creation.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::CreateLinkCommand;
use crate::domain::repositories::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// Authentication is optional. Authenticated callers own the link and may
/// configure gating; anonymous callers get an ungated link that expires in
/// 24 hours, whatever gating fields they sent.
///
/// # Errors
///
/// Returns 400 Bad Request on validation failure, 409 Conflict when a custom
/// code is taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let command = CreateLinkCommand {
        url: payload.url,
        custom_code: payload.custom_code,
        expires_at: payload.expires_at,
        access_code: payload.access_code,
        allowed_emails: payload.allowed_emails,
        click_limit: payload.click_limit,
        notify_on_visit: payload.notify_on_visit,
    };

    let link = state
        .link_service
        .create_link(command, user.as_ref().map(|Extension(u)| u))
        .await?;

    let short_url = state.link_service.short_url(&state.base_url, &link.code);

    Ok(Json(ShortenResponse {
        code: link.code,
        short_url,
        destination_url: link.destination_url,
        expires_at: link.expires_at,
    }))
}
