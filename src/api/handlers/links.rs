//! Handler for the owner's link listing.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde_json::json;

use crate::api::dto::links::{LinkListResponse, PaginationMeta, PaginationParams};
use crate::domain::repositories::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the authenticated user's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=25`
///
/// # Errors
///
/// Returns 400 Bad Request for invalid pagination parameters.
pub async fn links_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(25);

    let (items, total) = state.link_service.list_links(&user, offset, limit).await?;

    let total_pages = (total as f64 / page_size as f64).ceil() as u32;

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta {
            page,
            page_size,
            total_items: total,
            total_pages,
        },
        items: items.into_iter().map(Into::into).collect(),
    }))
}
