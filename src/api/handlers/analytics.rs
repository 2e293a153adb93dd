//! Handler for per-link analytics.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::domain::repositories::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns visit analytics for a link.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}`
///
/// Authentication is optional. The link's owner receives the full summary;
/// everyone else — including authenticated non-owners — receives only the
/// total visit count. The authorization decision happens in the service,
/// before any detailed aggregation runs.
///
/// # Errors
///
/// Returns 404 Not Found for an unknown code.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let viewer = user.as_ref().map(|Extension(u)| u);

    let analytics = state.analytics_service.summarize(&code, viewer).await?;

    Ok(Json(AnalyticsResponse::from_analytics(
        analytics,
        viewer.is_some(),
    )))
}
