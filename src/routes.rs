//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`              - Redirect (public, no credentials)
//! - `POST /{code}`              - Credentialed resolution (public)
//! - `GET  /health`              - Health check (public)
//! - `POST /api/shorten`         - Create a link (Bearer token optional)
//! - `GET  /api/analytics/{code}`- Visit analytics (Bearer token optional)
//! - `GET  /api/links`           - Own links listing (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging on everything
//! - **Rate limiting** - per-IP token bucket on `/api` only; redirects are
//!   the hot path and stay unthrottled
//! - **Authentication** - Bearer token, required or optional per route

use crate::api::handlers::{
    access_handler, analytics_handler, health_handler, links_handler, redirect_handler,
    shorten_handler,
};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let owner_routes = Router::new()
        .route("/links", get(links_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require));

    let open_routes = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/analytics/{code}", get(analytics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional,
        ));

    let api_router = owner_routes.merge(open_routes).layer(rate_limit::api_layer());

    let router = Router::new()
        .route("/{code}", get(redirect_handler).post(access_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
